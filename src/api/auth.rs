use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::validation::{validate_email, validate_password_len};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::core::security;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::auth::{LoginResponse, SignupResponse};
use crate::schemas::user::{UserCreate, UserLogin};

/// Max attempts per window for auth endpoints.
const AUTH_RATE_LIMIT: u64 = 10;
/// Rate limit window in seconds.
const AUTH_RATE_WINDOW_SECONDS: u64 = 60;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/signup", post(signup)).route("/login", post(login))
}

async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let email = payload.email.trim().to_ascii_lowercase();
    validate_email(&email)?;
    validate_password_len(&payload.password)?;

    if payload.fullname.trim().is_empty() {
        return Err(ApiError::BadRequest("Full name is required".to_string()));
    }

    let rate_key = format!("rl:signup:{email}");
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many signup attempts, try again later"));
    }

    let existing = repositories::users::exists_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;

    if existing.is_some() {
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let now = primitive_now_utc();
    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email: &email,
            hashed_password,
            full_name: payload.fullname.trim(),
            role: payload.role,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create user"))?;

    let token = security::create_access_token(&user.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Signup successful".to_string(),
            access_token: token,
            token_type: "bearer".to_string(),
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<UserLogin>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = payload.email.trim().to_ascii_lowercase();

    let rate_key = format!("rl:login:{email}");
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many login attempts, try again later"));
    }

    let user = repositories::users::find_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("Invalid credentials"))?;

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Invalid credentials"))?;

    if !verified {
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    // A teacher logging in through the student form (or vice versa) is
    // rejected the same way as a bad password.
    if user.role != payload.role {
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = security::create_access_token(&user.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    let redirect_page = match user.role {
        UserRole::Teacher => "teacher-dashboard.html",
        UserRole::Student => "student-dashboard.html",
    };
    let redirect =
        format!("{}/{redirect_page}", state.settings().api().frontend_base_url.trim_end_matches('/'));

    Ok(Json(LoginResponse {
        message: format!("Welcome, {}", user.full_name),
        redirect,
        name: user.full_name,
        role: user.role,
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

#[cfg(test)]
mod tests;
