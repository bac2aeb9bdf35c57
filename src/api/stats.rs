use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::stats::{StudentStatsResponse, TeacherStatsResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/dashboard-stats", get(dashboard_stats))
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    student: Option<String>,
}

/// Teachers get platform-wide counts (optionally scoped to one student via
/// `?student=`); students always get their own scope.
async fn dashboard_stats(
    CurrentUser(user): CurrentUser,
    Query(query): Query<StatsQuery>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let student_email = match user.role {
        UserRole::Student => Some(user.email),
        UserRole::Teacher => query.student.map(|value| value.trim().to_ascii_lowercase()),
    };

    if let Some(student_email) = student_email {
        let stats = repositories::stats::student_stats(state.db(), &student_email)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to compute student stats"))?;

        return Ok(Json(StudentStatsResponse {
            total_submissions: stats.total_submissions,
            evaluated: stats.evaluated,
            pending: stats.pending,
            average_percentage: (stats.average_percentage * 100.0).round() / 100.0,
        })
        .into_response());
    }

    let stats = repositories::stats::teacher_stats(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute dashboard stats"))?;

    Ok(Json(TeacherStatsResponse {
        total_exams: stats.total_exams,
        total_submissions: stats.total_submissions,
        evaluated: stats.evaluated,
        pending: stats.pending,
    })
    .into_response())
}

#[cfg(test)]
mod tests;
