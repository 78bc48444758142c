//! Uploaded-document chunks in Qdrant: ingestion and retrieval.
//!
//! This crate provides:
//! - [`DocumentStore`]: top-K similarity search returning [`DocumentChunkMatch`]es,
//!   and batched upserts of embedded [`DocumentChunk`]s
//! - [`extract_pdf_pages`] + [`chunk_pages`]: PDF bytes to page-tagged chunks
//! - [`LlmEmbedder`]: embeddings through `ai-llm-service`
//!
//! The design is flat and splits responsibilities into focused modules.

mod chunking;
mod config;
mod embedder;
mod errors;
mod filters;
mod ingest;
mod pdf;
mod qdrant_facade;
mod record;

pub use chunking::{ChunkingOptions, DocumentChunk, chunk_pages};
pub use config::RagConfig;
pub use embedder::LlmEmbedder;
pub use errors::RagError;
pub use pdf::extract_pdf_pages;
pub use record::{DocFilter, DocumentChunkMatch, clamp_excerpt};

use tracing::{info, trace};

/// High-level facade that wires configuration and Qdrant client.
pub struct DocumentStore {
    cfg: RagConfig,
    client: qdrant_facade::QdrantFacade,
}

impl DocumentStore {
    /// Constructs a new store from the given configuration.
    ///
    /// # Errors
    /// Returns `RagError::Config` / `RagError::Qdrant` if the client cannot be built.
    pub fn new(cfg: RagConfig) -> Result<Self, RagError> {
        trace!("DocumentStore::new collection={}", cfg.collection);
        let client = qdrant_facade::QdrantFacade::new(&cfg)?;
        Ok(Self { cfg, client })
    }

    /// Nearest `top_k` chunks for a query vector, best first.
    ///
    /// # Errors
    /// Returns `RagError::Qdrant` if the search fails.
    pub async fn search(
        &self,
        query_vector: Vec<f32>,
        top_k: u64,
        filter: Option<&DocFilter>,
    ) -> Result<Vec<DocumentChunkMatch>, RagError> {
        trace!("DocumentStore::search top_k={top_k}");
        let qfilter = filter
            .filter(|f| !f.is_empty())
            .map(filters::to_qdrant_filter);
        let hits = self
            .client
            .search(query_vector, top_k, qfilter, self.cfg.exact_search)
            .await?;
        Ok(rank_matches(hits, top_k))
    }

    /// Writes embedded chunks of one upload, creating the collection on
    /// first use. `vectors[i]` belongs to `chunks[i]`.
    ///
    /// Returns the number of points written.
    ///
    /// # Errors
    /// `RagError::VectorSizeMismatch` if a vector disagrees with the configured
    /// (or first) vector size; `RagError::Qdrant` if a write fails.
    pub async fn upsert_chunks(
        &self,
        upload_id: &str,
        chunks: &[DocumentChunk],
        vectors: Vec<Vec<f32>>,
    ) -> Result<u64, RagError> {
        let Some(first) = vectors.first() else {
            return Ok(0);
        };
        let vector_size = self.cfg.embedding_dim.unwrap_or(first.len());
        let points = ingest::build_points(upload_id, chunks, vectors, vector_size)?;

        self.client.ensure_collection(vector_size).await?;

        let mut total = 0;
        let mut points = points.into_iter().peekable();
        while points.peek().is_some() {
            let batch: Vec<_> = points.by_ref().take(self.cfg.upsert_batch).collect();
            total += self.client.upsert_points(batch).await?;
        }

        info!(upload_id, points = total, collection = %self.cfg.collection, "chunks ingested");
        Ok(total)
    }
}

/// Maps raw hits to matches, ordered by descending similarity and capped at `top_k`.
fn rank_matches(hits: Vec<(f32, serde_json::Value)>, top_k: u64) -> Vec<DocumentChunkMatch> {
    let mut out: Vec<DocumentChunkMatch> = hits
        .iter()
        .map(|(score, payload)| DocumentChunkMatch::from_payload(*score, payload))
        .collect();
    out.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
    out.truncate(usize::try_from(top_k).unwrap_or(usize::MAX));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ranks_by_score_and_caps() {
        let hits = vec![
            (0.2, json!({"fileName": "c.pdf", "page": 1, "textExcerpt": "c"})),
            (0.9, json!({"fileName": "a.pdf", "page": 2, "textExcerpt": "a"})),
            (0.5, json!({"fileName": "b.pdf", "page": 3, "textExcerpt": "b"})),
            (0.1, json!({"fileName": "d.pdf", "page": 4, "textExcerpt": "d"})),
        ];
        let out = rank_matches(hits, 3);
        let names: Vec<_> = out.iter().map(|m| m.source_file_name.as_str()).collect();
        assert_eq!(names, ["a.pdf", "b.pdf", "c.pdf"]);
    }
}
