//! Pipeline knobs loaded from environment variables.

use std::time::Duration;

use rag_store::ChunkingOptions;

use crate::generate::RetryPolicy;
use crate::retrieve::RetrievalLimits;

/// All fields have defaults; unparsable values fall back to them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextorConfig {
    /// Chunks used as chat document context (`CHAT_DOC_TOP_K`).
    pub chat_doc_top_k: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    /// Default K for document Q&A (`QUERY_TOP_K`).
    pub query_top_k: u64,

    pub hotspot_limit: usize,
    pub recommendation_limit: usize,
    pub event_limit: usize,

    /// Upload chunk window (`CHUNK_MAX_CHARS`) and overlap (`CHUNK_OVERLAP`).
    pub chunk_max_chars: usize,
    pub chunk_overlap: usize,
    /// Largest accepted upload (`UPLOAD_MAX_BYTES`).
    pub max_upload_bytes: usize,
}

impl Default for ContextorConfig {
    fn default() -> Self {
        Self {
            chat_doc_top_k: 3,
            max_attempts: 3,
            retry_delay_ms: 1000,
            query_top_k: 5,
            hotspot_limit: 10,
            recommendation_limit: 5,
            event_limit: 10,
            chunk_max_chars: 1000,
            chunk_overlap: 200,
            max_upload_bytes: crate::ingest::MAX_UPLOAD_BYTES,
        }
    }
}

impl ContextorConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            chat_doc_top_k: parse("CHAT_DOC_TOP_K", d.chat_doc_top_k),
            max_attempts: parse("CHAT_MAX_ATTEMPTS", d.max_attempts),
            retry_delay_ms: parse("CHAT_RETRY_DELAY_MS", d.retry_delay_ms),
            query_top_k: parse("QUERY_TOP_K", d.query_top_k),
            chunk_max_chars: parse("CHUNK_MAX_CHARS", d.chunk_max_chars),
            chunk_overlap: parse("CHUNK_OVERLAP", d.chunk_overlap),
            max_upload_bytes: parse("UPLOAD_MAX_BYTES", d.max_upload_bytes),
            ..d
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn retrieval_limits(&self) -> RetrievalLimits {
        RetrievalLimits {
            document_top_k: self.chat_doc_top_k,
            hotspots: self.hotspot_limit,
            recommendations: self.recommendation_limit,
            events: self.event_limit,
        }
    }

    pub fn chunking(&self) -> ChunkingOptions {
        ChunkingOptions {
            max_chars: self.chunk_max_chars,
            overlap: self.chunk_overlap,
        }
    }
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_chat_contract() {
        let c = ContextorConfig::default();
        assert_eq!(c.retry_policy(), RetryPolicy::default());
        assert_eq!(c.retrieval_limits(), RetrievalLimits::default());
        assert_eq!(c.query_top_k, 5);
        assert_eq!(c.chunking(), ChunkingOptions::default());
        assert_eq!(c.max_upload_bytes, 50 * 1024 * 1024);
    }
}
