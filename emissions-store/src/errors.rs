//! Error hierarchy for emissions-store.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type EmissionsResult<T> = Result<T, EmissionsError>;

/// Root error type for relational reads.
#[derive(Debug, Error)]
pub enum EmissionsError {
    /// Missing/invalid `SUPABASE_*` settings.
    #[error("config error: {0}")]
    Config(String),

    /// Unauthorized (HTTP 401) or forbidden (HTTP 403): bad or missing API key.
    #[error("unauthorized (status {0})")]
    Unauthorized(u16),

    /// Table or view does not exist (HTTP 404).
    #[error("relation not found: {0}")]
    NotFound(String),

    /// Gateway / server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other non-2xx status, e.g. a PostgREST 400 for an unknown column.
    #[error("http status error: status {status}: {snippet}")]
    HttpStatus { status: u16, snippet: String },

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Rows did not match the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for EmissionsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return EmissionsError::Timeout;
        }
        if e.is_decode() {
            return EmissionsError::InvalidResponse(e.to_string());
        }
        if let Some(status) = e.status() {
            return from_status(status.as_u16(), String::new());
        }
        EmissionsError::Network(e.to_string())
    }
}

/// Maps a non-2xx status to the matching variant.
pub(crate) fn from_status(code: u16, snippet: String) -> EmissionsError {
    match code {
        401 | 403 => EmissionsError::Unauthorized(code),
        404 => EmissionsError::NotFound(snippet),
        500..=599 => EmissionsError::Server(code),
        _ => EmissionsError::HttpStatus {
            status: code,
            snippet,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(from_status(401, String::new()), EmissionsError::Unauthorized(401)));
        assert!(matches!(from_status(403, String::new()), EmissionsError::Unauthorized(403)));
        assert!(matches!(from_status(404, "x".into()), EmissionsError::NotFound(ref s) if s == "x"));
        assert!(matches!(from_status(503, String::new()), EmissionsError::Server(503)));
        assert!(matches!(
            from_status(400, "bad column".into()),
            EmissionsError::HttpStatus { status: 400, .. }
        ));
    }
}
