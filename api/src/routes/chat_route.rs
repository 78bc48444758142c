//! POST /chat: assistant answer grounded in emissions data and uploads.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use contextor::ChatRequest;
use tracing::warn;

use crate::{app_core::app_state::AppState, error_handler::AppError};

/// Handler: POST /chat
///
/// 400 only for a missing/blank `message` or an unreadable body, answered as
/// `{"error": "Message is required"}`. Model outages still answer 200 with
/// the fallback text and an `error` field.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:4000/api/chat \
///   -H 'content-type: application/json' \
///   -d '{"message":"Which supplier should we fix first?"}'
/// ```
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(req)) => state.pipeline.chat(&req).await.map_err(AppError::from),
        Err(rej) => Err(AppError::from(rej)),
    };

    match result {
        Ok(out) => Json(out).into_response(),
        Err(e) => {
            warn!(error = %e, "chat request rejected");
            e.into_message_response()
        }
    }
}
