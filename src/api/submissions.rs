use std::collections::HashMap;

use axum::{
    extract::{Multipart, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStudent, CurrentTeacher, CurrentUser};
use crate::api::helpers::{read_field_bytes, read_field_text, require_field};
use crate::api::validation::validate_file_upload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Submission, SubmissionFile};
use crate::db::types::{SheetType, UserRole};
use crate::repositories;
use crate::schemas::submission::{
    PendingListResponse, SubmissionListResponse, SubmissionResponse, UploadAnswerResponse,
};
use crate::services::storage::sanitized_filename;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/upload-answer", post(upload_answer))
        .route("/student-submissions", get(all_submissions))
        .route("/get-student-submissions", get(student_submissions))
        .route("/pending-answers", get(pending_answers))
}

async fn upload_answer(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadAnswerResponse>, ApiError> {
    let mut files: Vec<(String, String, Vec<u8>)> = Vec::new();
    let mut exam_name: Option<String> = None;
    let mut subject: Option<String> = None;
    let mut roll_number: Option<String> = None;
    let mut notes = String::new();
    let mut answer_sheet_type = String::from("descriptive");
    let max_bytes = state.settings().storage().max_upload_size_mb * 1024 * 1024;
    let max_files = state.settings().storage().max_files_per_submission as usize;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "files" | "files[]" | "file" => {
                if files.len() >= max_files {
                    return Err(ApiError::BadRequest(format!(
                        "Maximum number of files per submission exceeded ({max_files})"
                    )));
                }
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "answer-sheet".to_string());
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = read_field_bytes(&mut field, max_bytes, state.settings()).await?;
                files.push((filename, content_type, bytes));
            }
            "exam_name" => exam_name = Some(read_field_text(field).await?),
            "subject" => subject = Some(read_field_text(field).await?),
            "roll_number" => roll_number = Some(read_field_text(field).await?),
            "notes" => notes = read_field_text(field).await?,
            "answer_sheet_type" => answer_sheet_type = read_field_text(field).await?,
            // Legacy `student` identity field: the bearer token already
            // identifies the uploader.
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest("No files uploaded".to_string()));
    }
    let exam_name = require_field(exam_name, "exam_name")?;
    let subject = require_field(subject, "subject")?;
    let roll_number = require_field(roll_number, "roll_number")?;

    for (filename, content_type, bytes) in &files {
        validate_file_upload(
            filename,
            content_type,
            &state.settings().storage().allowed_extensions,
        )?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest(format!("Uploaded file '{filename}' is empty")));
        }
    }

    let sheet_type = SheetType::parse(&answer_sheet_type);
    let submission_id = Uuid::new_v4().to_string();
    let now = primitive_now_utc();

    let submission = repositories::submissions::create(
        state.db(),
        repositories::submissions::CreateSubmission {
            id: &submission_id,
            student_email: &student.email,
            exam_name: exam_name.trim(),
            subject: subject.trim(),
            roll_number: roll_number.trim(),
            answer_sheet_type: sheet_type,
            notes: notes.trim(),
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create submission"))?;

    let file_count = files.len();
    for (order_index, (filename, content_type, bytes)) in files.into_iter().enumerate() {
        let file_id = Uuid::new_v4().to_string();
        let storage_key = format!(
            "answers/{}/{}/{}_{}",
            sheet_type.folder(),
            submission_id,
            file_id,
            sanitized_filename(&filename)
        );
        let stored = state
            .storage()
            .upload_bytes(&storage_key, bytes)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to store answer-sheet file"))?;

        repositories::files::insert(
            state.db(),
            &file_id,
            &submission_id,
            &filename,
            &stored.key,
            &stored.url,
            stored.size,
            &content_type,
            order_index as i32,
            now,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store file metadata"))?;
    }

    tracing::info!(
        submission_id = %submission.id,
        student = %student.email,
        exam_name = %submission.exam_name,
        files = file_count,
        "Answer sheet uploaded"
    );

    Ok(Json(UploadAnswerResponse {
        message: format!("{file_count} file(s) uploaded successfully"),
        submission_id,
    }))
}

#[derive(Debug, Deserialize)]
struct StudentQuery {
    student: Option<String>,
}

async fn all_submissions(
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<SubmissionListResponse>, ApiError> {
    let submissions = repositories::submissions::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    let submissions = with_files(state.db(), submissions).await?;
    Ok(Json(SubmissionListResponse { submissions }))
}

async fn student_submissions(
    CurrentUser(user): CurrentUser,
    Query(query): Query<StudentQuery>,
    State(state): State<AppState>,
) -> Result<Json<SubmissionListResponse>, ApiError> {
    // Students always see their own submissions; the query parameter is only
    // honoured for teachers.
    let student_email = match user.role {
        UserRole::Student => user.email,
        UserRole::Teacher => query
            .student
            .map(|value| value.trim().to_ascii_lowercase())
            .ok_or_else(|| ApiError::BadRequest("Missing 'student' query parameter".to_string()))?,
    };

    let submissions = repositories::submissions::list_by_student(state.db(), &student_email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    let submissions = with_files(state.db(), submissions).await?;
    Ok(Json(SubmissionListResponse { submissions }))
}

async fn pending_answers(
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<PendingListResponse>, ApiError> {
    let submissions = repositories::submissions::list_pending(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list pending submissions"))?;

    let pending = with_files(state.db(), submissions).await?;
    Ok(Json(PendingListResponse { pending }))
}

async fn with_files(
    pool: &PgPool,
    submissions: Vec<Submission>,
) -> Result<Vec<SubmissionResponse>, ApiError> {
    let ids: Vec<String> = submissions.iter().map(|submission| submission.id.clone()).collect();
    let files = repositories::files::list_by_submissions(pool, &ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load submission files"))?;

    let mut by_submission: HashMap<String, Vec<SubmissionFile>> = HashMap::new();
    for file in files {
        by_submission.entry(file.submission_id.clone()).or_default().push(file);
    }

    Ok(submissions
        .into_iter()
        .map(|submission| {
            let files = by_submission.remove(&submission.id).unwrap_or_default();
            SubmissionResponse::from_db(submission, files)
        })
        .collect())
}
