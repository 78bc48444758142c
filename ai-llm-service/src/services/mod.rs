pub mod ollama_service;
pub mod open_ai_service;

use reqwest::Response;

use crate::error_handler::{HttpError, make_snippet};

/// Turns a non-2xx response into an [`HttpError`], consuming the body for the snippet.
pub(crate) async fn http_error(resp: Response, url: &str) -> HttpError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    HttpError {
        status,
        url: url.to_string(),
        snippet: make_snippet(&text),
    }
}
