use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::core::state::AppState;
use crate::core::time::format_primitive;
use crate::db::types::SubmissionStatus;
use crate::repositories;
use crate::schemas::submission::{
    EvaluateResponse, EvaluationReportResponse, ManualEvaluationRequest,
};
use crate::schemas::MessageResponse;
use crate::services::evaluation;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/ai-evaluate/:reference", post(ai_evaluate))
        .route("/evaluate-submission", post(manual_evaluate))
        .route("/evaluation-report/:reference", get(evaluation_report))
}

async fn ai_evaluate(
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let outcome = evaluation::evaluate(&state, &reference).await?;

    tracing::info!(
        submission_id = %outcome.submission_id,
        marks_obtained = outcome.marks_obtained,
        total_marks = outcome.total_marks,
        "AI evaluation finished"
    );

    Ok(Json(EvaluateResponse {
        message: format!("AI evaluation complete for roll number {}", outcome.roll_number),
        marks_obtained: outcome.marks_obtained,
        total_marks: outcome.total_marks,
        feedback: outcome.feedback,
    }))
}

async fn manual_evaluate(
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<ManualEvaluationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload
        .validate()
        .map_err(|err| ApiError::BadRequest(format!("Invalid evaluation data: {err}")))?;

    if payload.total_marks <= 0 {
        return Err(ApiError::BadRequest("total_marks must be positive".to_string()));
    }

    evaluation::evaluate_manually(
        &state,
        payload.roll_number.trim(),
        payload.exam_name.trim(),
        payload.marks_obtained,
        payload.total_marks,
        payload.feedback.trim(),
    )
    .await?;

    Ok(Json(MessageResponse { message: "Submission evaluated successfully".to_string() }))
}

async fn evaluation_report(
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<EvaluationReportResponse>, ApiError> {
    let submission = match repositories::submissions::find_by_id(state.db(), &reference)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load submission"))?
    {
        Some(submission) => Some(submission),
        None => repositories::submissions::find_latest_by_roll(state.db(), &reference)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load submission"))?,
    };

    let Some(submission) = submission else {
        return Err(ApiError::NotFound(format!("No submission found for '{reference}'")));
    };

    if submission.status != SubmissionStatus::Evaluated {
        return Err(ApiError::NotFound(format!(
            "No evaluated submission found for '{reference}'"
        )));
    }

    Ok(Json(EvaluationReportResponse {
        roll_number: submission.roll_number,
        exam_name: submission.exam_name,
        subject: submission.subject,
        marks_obtained: submission.marks_obtained,
        total_marks: submission.total_marks,
        feedback: submission.feedback,
        evaluation_method: submission.evaluation_method,
        evaluated_at: submission.evaluated_at.map(format_primitive),
    }))
}
