use axum::extract::multipart::Field;

use crate::api::errors::ApiError;
use crate::core::config::Settings;

pub(super) async fn read_field_bytes(
    field: &mut Field<'_>,
    max_bytes: u64,
    settings: &Settings,
) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) =
        field.chunk().await.map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
    {
        let next_size = bytes.len() as u64 + chunk.len() as u64;
        if next_size > max_bytes {
            return Err(ApiError::BadRequest(format!(
                "File size exceeds {}MB limit",
                settings.storage().max_upload_size_mb
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

pub(super) async fn read_field_text(field: Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(|_| ApiError::BadRequest("Invalid form field".to_string()))
}

pub(super) fn require_field(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::BadRequest(format!("Missing required field '{name}'"))),
    }
}
