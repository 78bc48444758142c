//! Runtime configuration for the document store.

use crate::errors::RagError;

/// Configuration for document retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Collection holding uploaded-document chunks.
    pub collection: String,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
    /// Expected embedding size; `None` skips the check.
    pub embedding_dim: Option<usize>,
    /// Points per upsert request during ingestion.
    pub upsert_batch: usize,
}

impl RagConfig {
    /// Creates a default config for a given collection name and Qdrant endpoint.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            exact_search: false,
            embedding_dim: None,
            upsert_batch: 64,
        }
    }

    /// Reads `QDRANT_URL`, `QDRANT_API_KEY`, `QDRANT_COLLECTION`,
    /// `RAG_EXACT_SEARCH`, `EMBEDDING_DIM` and `QDRANT_UPSERT_BATCH`.
    pub fn from_env() -> Result<Self, RagError> {
        let mut cfg = Self::new_default(
            env("QDRANT_URL", "http://127.0.0.1:6334"),
            env("QDRANT_COLLECTION", "documents"),
        );
        cfg.qdrant_api_key = std::env::var("QDRANT_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());
        cfg.exact_search = env("RAG_EXACT_SEARCH", "false") == "true";
        cfg.embedding_dim = match std::env::var("EMBEDDING_DIM") {
            Ok(v) if !v.trim().is_empty() => Some(v.trim().parse::<usize>().map_err(|_| {
                RagError::Config(format!("EMBEDDING_DIM must be a positive integer, got {v:?}"))
            })?),
            _ => None,
        };
        cfg.upsert_batch = env("QDRANT_UPSERT_BATCH", "64")
            .trim()
            .parse()
            .unwrap_or(64);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        if self.embedding_dim == Some(0) {
            return Err(RagError::Config("embedding_dim must be > 0".into()));
        }
        Ok(())
    }
}

fn env(k: &str, dflt: &str) -> String {
    std::env::var(k)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| dflt.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_blank_fields() {
        assert!(RagConfig::new_default("", "documents").validate().is_err());
        assert!(RagConfig::new_default("http://q:6334", " ").validate().is_err());

        let mut cfg = RagConfig::new_default("http://q:6334", "documents");
        assert!(cfg.validate().is_ok());
        cfg.embedding_dim = Some(0);
        assert!(cfg.validate().is_err());

        let mut cfg = RagConfig::new_default("http://q:6334", "documents");
        cfg.upsert_batch = 0;
        assert!(cfg.validate().is_err());
    }
}
