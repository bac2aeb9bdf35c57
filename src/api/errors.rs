use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::evaluation::EvaluationError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    TooManyRequests(&'static str),
    BadGateway(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                let mut response = (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse { error: message.to_string() }),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, Json(ErrorResponse { error: message.to_string() }))
                    .into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { error: message })).into_response()
            }
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(ErrorResponse { error: message })).into_response()
            }
            ApiError::TooManyRequests(message) => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse { error: message.to_string() }),
            )
                .into_response(),
            ApiError::BadGateway(message) => {
                tracing::warn!(error = %message, "Upstream evaluation failure");
                (StatusCode::BAD_GATEWAY, Json(ErrorResponse { error: message })).into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: message }))
                    .into_response()
            }
        }
    }
}

impl From<EvaluationError> for ApiError {
    fn from(err: EvaluationError) -> Self {
        match err {
            EvaluationError::NotFound => ApiError::NotFound(err.to_string()),
            EvaluationError::AlreadyEvaluated => ApiError::Conflict(err.to_string()),
            EvaluationError::NoMatchingKey { .. } => ApiError::BadGateway(err.to_string()),
            EvaluationError::UnsupportedSheetType => ApiError::BadRequest(err.to_string()),
            EvaluationError::NoFiles => ApiError::BadRequest(err.to_string()),
            EvaluationError::Service(_) => ApiError::BadGateway(err.to_string()),
            EvaluationError::Database(inner) => {
                ApiError::internal(inner, "Failed to update submission")
            }
        }
    }
}
