use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::api::errors::ApiError;
use crate::api::validation::content_type_for_extension;
use crate::core::state::AppState;

/// Serves stored uploads back by their generated URL path. The storage
/// service rejects any key that would escape the upload root.
pub(crate) async fn serve_upload(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let Some(resolved) = state.storage().resolve(&path) else {
        return Err(ApiError::Forbidden("Unauthorized file access attempt"));
    };

    let bytes = match tokio::fs::read(&resolved).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!("File not found: {path}")));
        }
        Err(err) => return Err(ApiError::internal(err, "Failed to read stored file")),
    };

    let content_type = content_type_for_extension(&path);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
