//! Production collaborators: Ollama/OpenAI through `ai-llm-service`, Qdrant
//! and PDF parsing through `rag-store`, PostgREST through `emissions-store`.

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use emissions_store::{EmissionsClient, Hotspot, NormalizedEvent, Recommendation};
use rag_store::{DocFilter, DocumentChunk, DocumentChunkMatch, DocumentStore, LlmEmbedder};

use crate::collaborators::{
    AnswerGenerator, BoxFuture, ChunkWriter, Embedder, EmissionsReader, PdfTextExtractor,
    VectorSearcher,
};
use crate::error::ContextorError;

impl Embedder for LlmEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, ContextorError>> {
        Box::pin(async move { Ok(LlmEmbedder::embed(self, text).await?) })
    }
}

impl VectorSearcher for DocumentStore {
    fn search<'a>(
        &'a self,
        vector: Vec<f32>,
        filter: Option<&'a DocFilter>,
        top_k: u64,
    ) -> BoxFuture<'a, Result<Vec<DocumentChunkMatch>, ContextorError>> {
        Box::pin(async move { Ok(DocumentStore::search(self, vector, top_k, filter).await?) })
    }
}

impl ChunkWriter for DocumentStore {
    fn write<'a>(
        &'a self,
        upload_id: &'a str,
        chunks: &'a [DocumentChunk],
        vectors: Vec<Vec<f32>>,
    ) -> BoxFuture<'a, Result<u64, ContextorError>> {
        Box::pin(async move { Ok(self.upsert_chunks(upload_id, chunks, vectors).await?) })
    }
}

/// Text layer extraction with `pdf-extract`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfExtractReader;

impl PdfTextExtractor for PdfExtractReader {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ContextorError> {
        Ok(rag_store::extract_pdf_pages(bytes)?)
    }
}

impl EmissionsReader for EmissionsClient {
    fn active_hotspots(&self, limit: usize) -> BoxFuture<'_, Result<Vec<Hotspot>, ContextorError>> {
        Box::pin(async move { Ok(EmissionsClient::active_hotspots(self, limit).await?) })
    }

    fn pending_recommendations(
        &self,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<Recommendation>, ContextorError>> {
        Box::pin(async move { Ok(EmissionsClient::pending_recommendations(self, limit).await?) })
    }

    fn recent_events(
        &self,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<NormalizedEvent>, ContextorError>> {
        Box::pin(async move { Ok(EmissionsClient::recent_events(self, limit).await?) })
    }
}

/// Chat-profile generation without a separate system message; the whole
/// assembled prompt goes in as the user turn.
#[derive(Clone, Debug)]
pub struct LlmAnswerGenerator {
    svc: Arc<LlmServiceProfiles>,
}

impl LlmAnswerGenerator {
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Self {
        Self { svc }
    }
}

impl AnswerGenerator for LlmAnswerGenerator {
    fn invoke<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, ContextorError>> {
        Box::pin(async move { Ok(self.svc.generate(prompt, None).await?) })
    }
}
