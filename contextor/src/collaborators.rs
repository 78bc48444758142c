//! Capabilities the pipeline depends on.
//!
//! Every external system is reached through one of these traits so the
//! pipeline can be driven by fakes in tests. Production implementations live
//! in [`crate::adapters`].

use std::{future::Future, pin::Pin, time::Duration};

use emissions_store::{Hotspot, NormalizedEvent, Recommendation};
use rag_store::{DocFilter, DocumentChunk, DocumentChunkMatch};

use crate::error::ContextorError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Text to vector.
pub trait Embedder: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, ContextorError>>;
}

/// Nearest-neighbour search over uploaded-document chunks, best match first.
pub trait VectorSearcher: Send + Sync {
    fn search<'a>(
        &'a self,
        vector: Vec<f32>,
        filter: Option<&'a DocFilter>,
        top_k: u64,
    ) -> BoxFuture<'a, Result<Vec<DocumentChunkMatch>, ContextorError>>;
}

/// Read-only access to the emissions tables.
pub trait EmissionsReader: Send + Sync {
    fn active_hotspots(&self, limit: usize) -> BoxFuture<'_, Result<Vec<Hotspot>, ContextorError>>;

    fn pending_recommendations(
        &self,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<Recommendation>, ContextorError>>;

    fn recent_events(
        &self,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<NormalizedEvent>, ContextorError>>;
}

/// Single-shot language model call. May fail or return empty text.
pub trait AnswerGenerator: Send + Sync {
    fn invoke<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, ContextorError>>;
}

/// PDF bytes to per-page text. Blocking; callers move it off the runtime.
pub trait PdfTextExtractor: Send + Sync {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ContextorError>;
}

/// Persists embedded chunks of one upload. Returns how many were written.
pub trait ChunkWriter: Send + Sync {
    fn write<'a>(
        &'a self,
        upload_id: &'a str,
        chunks: &'a [DocumentChunk],
        vectors: Vec<Vec<f32>>,
    ) -> BoxFuture<'a, Result<u64, ContextorError>>;
}

/// Waits between generation attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration) -> BoxFuture<'_, ()>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(delay))
    }
}
