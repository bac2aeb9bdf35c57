use axum::{
    extract::{Multipart, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentTeacher, CurrentUser};
use crate::api::helpers::{read_field_bytes, read_field_text, require_field};
use crate::api::validation::validate_file_upload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::KeyType;
use crate::repositories;
use crate::schemas::{ExamEntryResponse, ExamsResponse, MessageResponse};
use crate::services::storage::sanitized_filename;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/upload-key", post(upload_key))
        .route("/get-exams", get(get_exams))
}

async fn upload_key(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut exam_name: Option<String> = None;
    let mut subject: Option<String> = None;
    let mut total_marks: Option<String> = None;
    let mut key_type: Option<String> = None;
    let max_bytes = state.settings().storage().max_upload_size_mb * 1024 * 1024;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename =
                    field.file_name().map(|s| s.to_string()).unwrap_or_else(|| "key".to_string());
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = read_field_bytes(&mut field, max_bytes, state.settings()).await?;
                file = Some((filename, content_type, bytes));
            }
            "exam_name" => exam_name = Some(read_field_text(field).await?),
            "subject" => subject = Some(read_field_text(field).await?),
            "total_marks" => total_marks = Some(read_field_text(field).await?),
            "key_type" => key_type = Some(read_field_text(field).await?),
            // Legacy `teacher` identity field: the bearer token already
            // identifies the uploader.
            _ => {}
        }
    }

    let (filename, content_type, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    let exam_name = require_field(exam_name, "exam_name")?;
    let subject = require_field(subject, "subject")?;
    let total_marks_raw = require_field(total_marks, "total_marks")?;
    let key_type_raw = require_field(key_type, "key_type")?;

    let total_marks: i32 = total_marks_raw
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest("Total marks must be a valid number".to_string()))?;
    if total_marks <= 0 {
        return Err(ApiError::BadRequest("Total marks must be positive".to_string()));
    }

    let key_type = match key_type_raw.trim().to_ascii_lowercase().as_str() {
        "descriptive" => KeyType::Descriptive,
        "mcq" => KeyType::Mcq,
        other => {
            return Err(ApiError::BadRequest(format!("Unknown key type '{other}'")));
        }
    };

    validate_file_upload(&filename, &content_type, &state.settings().storage().allowed_extensions)?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    let key_id = Uuid::new_v4().to_string();
    let storage_key = format!("keys/{key_id}_{}", sanitized_filename(&filename));
    let stored = state
        .storage()
        .upload_bytes(&storage_key, bytes)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store answer key file"))?;

    repositories::answer_keys::create(
        state.db(),
        repositories::answer_keys::CreateAnswerKey {
            id: &key_id,
            exam_name: exam_name.trim(),
            subject: subject.trim(),
            total_marks,
            key_type,
            filename: &filename,
            file_path: &stored.key,
            file_url: &stored.url,
            teacher_email: &teacher.email,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to store answer key"))?;

    tracing::info!(
        exam_name = %exam_name,
        subject = %subject,
        teacher = %teacher.email,
        "Answer key uploaded"
    );

    Ok(Json(MessageResponse {
        message: "Answer key and exam details uploaded successfully".to_string(),
    }))
}

async fn get_exams(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ExamsResponse>, ApiError> {
    let exams = repositories::answer_keys::list_distinct_exams(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;

    Ok(Json(ExamsResponse {
        exams: exams
            .into_iter()
            .map(|entry| ExamEntryResponse {
                exam_name: entry.exam_name,
                subject: entry.subject,
                filename: entry.filename,
            })
            .collect(),
    }))
}

#[cfg(test)]
mod tests;
