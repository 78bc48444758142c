//! POST /query: document Q&A with citations.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use contextor::{QueryAnswer, QueryRequest};
use tracing::warn;

use crate::{
    app_core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppError,
};

/// Handler: POST /query
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:4000/query \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is scope 3?","topK":5,"fileName":"notes.pdf"}'
/// ```
pub async fn query(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(req)) => state.pipeline.query(&req).await.map_err(AppError::from),
        Err(rej) => Err(AppError::from(rej)),
    };

    match result {
        Ok(answer) => ApiResponse::success(answer).into_response_with_status(StatusCode::OK),
        Err(e) => {
            warn!(error = %e, "query failed");
            ApiResponse::<QueryAnswer>::error(e.error_code(), e.to_string())
                .into_response_with_status(e.status_code())
        }
    }
}
