//! POST /upload and GET /upload/{id}/status: PDF ingestion into the
//! document collection.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State, rejection::MultipartRejection},
    http::StatusCode,
    response::Response,
};
use contextor::UploadStatus;
use tracing::warn;

use crate::{
    app_core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
};

/// Multipart form field carrying the file.
const FILE_FIELD: &str = "file";

/// Handler: POST /upload
///
/// Accepts one `application/pdf` file in the `file` field and answers 202
/// with the upload id while indexing continues in the background.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:4000/api/upload \
///   -F 'file=@esg-report.pdf;type=application/pdf'
/// ```
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    match accept(&state, multipart).await {
        Ok(status) => ApiResponse::success(status).into_response_with_status(StatusCode::ACCEPTED),
        Err(e) => {
            warn!(error = %e, "upload rejected");
            ApiResponse::<UploadStatus>::error(e.error_code(), e.to_string())
                .into_response_with_status(e.status_code())
        }
    }
}

async fn accept(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<UploadStatus> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("document.pdf")
            .to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        let status = state
            .ingest
            .submit(&file_name, content_type.as_deref(), bytes.to_vec())
            .await?;
        return Ok(status);
    }

    Err(AppError::BadRequest("No file uploaded".into()))
}

/// Handler: GET /upload/{id}/status
pub async fn upload_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.ingest.status(&id).await {
        Some(status) => ApiResponse::success(status).into_response_with_status(StatusCode::OK),
        None => ApiResponse::<UploadStatus>::error("NOT_FOUND", "Upload not found")
            .into_response_with_status(StatusCode::NOT_FOUND),
    }
}
