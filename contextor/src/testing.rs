//! In-memory collaborators with call counters.
//!
//! Enabled for this crate's tests and, through the `test-support` feature,
//! for downstream crates that drive a [`crate::ChatPipeline`] without network.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use emissions_store::{Hotspot, NormalizedEvent, Recommendation};
use rag_store::{DocFilter, DocumentChunk, DocumentChunkMatch};

use crate::collaborators::{
    AnswerGenerator, BoxFuture, ChunkWriter, Embedder, EmissionsReader, PdfTextExtractor,
    Sleeper, VectorSearcher,
};
use crate::error::ContextorError;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

fn down(what: &str) -> ContextorError {
    ContextorError::Unavailable(format!("{what} is down"))
}

#[derive(Default)]
pub struct FakeEmbedder {
    failing: Mutex<bool>,
    calls: Mutex<usize>,
}

impl FakeEmbedder {
    pub fn fail(&self) {
        *lock(&self.failing) = true;
    }

    pub fn calls(&self) -> usize {
        *lock(&self.calls)
    }
}

impl Embedder for FakeEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, ContextorError>> {
        Box::pin(async move {
            *lock(&self.calls) += 1;
            if *lock(&self.failing) {
                return Err(down("embedder"));
            }
            Ok(vec![text.len() as f32, 1.0, 0.0])
        })
    }
}

#[derive(Default)]
pub struct FakeSearcher {
    matches: Mutex<Vec<DocumentChunkMatch>>,
    failing: Mutex<bool>,
    calls: Mutex<usize>,
    last_top_k: Mutex<Option<u64>>,
    last_filter: Mutex<Option<Vec<(String, serde_json::Value)>>>,
}

impl FakeSearcher {
    pub fn set_matches(&self, matches: Vec<DocumentChunkMatch>) {
        *lock(&self.matches) = matches;
    }

    pub fn fail(&self) {
        *lock(&self.failing) = true;
    }

    pub fn calls(&self) -> usize {
        *lock(&self.calls)
    }

    pub fn last_top_k(&self) -> Option<u64> {
        *lock(&self.last_top_k)
    }

    /// Equality conditions of the most recent filtered search.
    pub fn last_filter(&self) -> Option<Vec<(String, serde_json::Value)>> {
        lock(&self.last_filter).clone()
    }
}

impl VectorSearcher for FakeSearcher {
    fn search<'a>(
        &'a self,
        _vector: Vec<f32>,
        filter: Option<&'a DocFilter>,
        top_k: u64,
    ) -> BoxFuture<'a, Result<Vec<DocumentChunkMatch>, ContextorError>> {
        Box::pin(async move {
            *lock(&self.calls) += 1;
            *lock(&self.last_top_k) = Some(top_k);
            *lock(&self.last_filter) = filter.map(|f| f.equals.clone());
            if *lock(&self.failing) {
                return Err(down("vector store"));
            }
            let mut out = lock(&self.matches).clone();
            out.truncate(usize::try_from(top_k).unwrap_or(usize::MAX));
            Ok(out)
        })
    }
}

#[derive(Default)]
pub struct FakeEmissions {
    hotspots: Mutex<Vec<Hotspot>>,
    recommendations: Mutex<Vec<Recommendation>>,
    events: Mutex<Vec<NormalizedEvent>>,
    fail_hotspots: Mutex<bool>,
    fail_recommendations: Mutex<bool>,
    fail_events: Mutex<bool>,
    calls: Mutex<usize>,
}

impl FakeEmissions {
    pub fn set_hotspots(&self, rows: Vec<Hotspot>) {
        *lock(&self.hotspots) = rows;
    }

    pub fn set_recommendations(&self, rows: Vec<Recommendation>) {
        *lock(&self.recommendations) = rows;
    }

    pub fn set_events(&self, rows: Vec<NormalizedEvent>) {
        *lock(&self.events) = rows;
    }

    pub fn fail_recommendations(&self) {
        *lock(&self.fail_recommendations) = true;
    }

    pub fn fail_all(&self) {
        *lock(&self.fail_hotspots) = true;
        *lock(&self.fail_recommendations) = true;
        *lock(&self.fail_events) = true;
    }

    /// Reads across all three tables.
    pub fn calls(&self) -> usize {
        *lock(&self.calls)
    }

    fn read<T: Clone>(
        &self,
        rows: &Mutex<Vec<T>>,
        failing: &Mutex<bool>,
        limit: usize,
        what: &str,
    ) -> Result<Vec<T>, ContextorError> {
        *lock(&self.calls) += 1;
        if *lock(failing) {
            return Err(down(what));
        }
        Ok(lock(rows).iter().take(limit).cloned().collect())
    }
}

impl EmissionsReader for FakeEmissions {
    fn active_hotspots(&self, limit: usize) -> BoxFuture<'_, Result<Vec<Hotspot>, ContextorError>> {
        Box::pin(async move { self.read(&self.hotspots, &self.fail_hotspots, limit, "hotspots") })
    }

    fn pending_recommendations(
        &self,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<Recommendation>, ContextorError>> {
        Box::pin(async move {
            self.read(&self.recommendations, &self.fail_recommendations, limit, "recommendations")
        })
    }

    fn recent_events(
        &self,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<NormalizedEvent>, ContextorError>> {
        Box::pin(async move { self.read(&self.events, &self.fail_events, limit, "events") })
    }
}

/// One scripted model reply.
#[derive(Clone, Debug)]
pub enum Reply {
    Text(String),
    Fail,
}

/// Replays a script; once it runs out every call fails.
#[derive(Default)]
pub struct FakeLlm {
    script: Mutex<Vec<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    pub fn scripted(mut replies: Vec<Reply>) -> Self {
        replies.reverse();
        Self {
            script: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(text: &str) -> Self {
        Self::scripted(vec![Reply::Text(text.to_string())])
    }

    pub fn calls(&self) -> usize {
        lock(&self.prompts).len()
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

impl AnswerGenerator for FakeLlm {
    fn invoke<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, ContextorError>> {
        Box::pin(async move {
            lock(&self.prompts).push(prompt.to_string());
            match lock(&self.script).pop() {
                Some(Reply::Text(t)) => Ok(t),
                Some(Reply::Fail) | None => Err(down("model")),
            }
        })
    }
}

/// Records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.delays).clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) -> BoxFuture<'_, ()> {
        lock(&self.delays).push(delay);
        Box::pin(async {})
    }
}

/// Returns the configured pages for any input bytes.
#[derive(Default)]
pub struct FakePdf {
    pages: Mutex<Vec<String>>,
    failing: Mutex<bool>,
    calls: Mutex<usize>,
}

impl FakePdf {
    pub fn set_pages(&self, pages: &[&str]) {
        *lock(&self.pages) = pages.iter().map(|p| p.to_string()).collect();
    }

    pub fn fail(&self) {
        *lock(&self.failing) = true;
    }

    pub fn calls(&self) -> usize {
        *lock(&self.calls)
    }
}

impl PdfTextExtractor for FakePdf {
    fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>, ContextorError> {
        *lock(&self.calls) += 1;
        if *lock(&self.failing) {
            return Err(ContextorError::Rag(rag_store::RagError::Pdf(
                "invalid file header".into(),
            )));
        }
        Ok(lock(&self.pages).clone())
    }
}

/// One accepted `ChunkWriter::write` call.
#[derive(Clone, Debug)]
pub struct WrittenBatch {
    pub upload_id: String,
    pub chunks: Vec<DocumentChunk>,
    /// Number of vectors received.
    pub vectors: usize,
}

#[derive(Default)]
pub struct FakeChunkWriter {
    batches: Mutex<Vec<WrittenBatch>>,
    failing: Mutex<bool>,
    calls: Mutex<usize>,
}

impl FakeChunkWriter {
    pub fn fail(&self) {
        *lock(&self.failing) = true;
    }

    pub fn calls(&self) -> usize {
        *lock(&self.calls)
    }

    pub fn batches(&self) -> Vec<WrittenBatch> {
        lock(&self.batches).clone()
    }
}

impl ChunkWriter for FakeChunkWriter {
    fn write<'a>(
        &'a self,
        upload_id: &'a str,
        chunks: &'a [DocumentChunk],
        vectors: Vec<Vec<f32>>,
    ) -> BoxFuture<'a, Result<u64, ContextorError>> {
        Box::pin(async move {
            *lock(&self.calls) += 1;
            if *lock(&self.failing) {
                return Err(down("vector store"));
            }
            lock(&self.batches).push(WrittenBatch {
                upload_id: upload_id.to_string(),
                chunks: chunks.to_vec(),
                vectors: vectors.len(),
            });
            Ok(chunks.len() as u64)
        })
    }
}

/// All fakes at once, sharing nothing.
pub struct Fixture {
    pub embedder: Arc<FakeEmbedder>,
    pub searcher: Arc<FakeSearcher>,
    pub emissions: Arc<FakeEmissions>,
    pub llm: Arc<FakeLlm>,
    pub sleeper: Arc<RecordingSleeper>,
    pub pdf: Arc<FakePdf>,
    pub writer: Arc<FakeChunkWriter>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::with_llm(FakeLlm::default())
    }
}

impl Fixture {
    pub fn with_llm(llm: FakeLlm) -> Self {
        Self {
            embedder: Arc::default(),
            searcher: Arc::default(),
            emissions: Arc::default(),
            llm: Arc::new(llm),
            sleeper: Arc::default(),
            pdf: Arc::default(),
            writer: Arc::default(),
        }
    }

    pub fn collaborators(&self) -> crate::Collaborators {
        crate::Collaborators {
            embedder: self.embedder.clone(),
            searcher: self.searcher.clone(),
            emissions: self.emissions.clone(),
            llm: self.llm.clone(),
            sleeper: self.sleeper.clone(),
        }
    }

    /// Upload collaborators; the embedder is shared with chat.
    pub fn ingest_collaborators(&self) -> crate::IngestCollaborators {
        crate::IngestCollaborators {
            extractor: self.pdf.clone(),
            embedder: self.embedder.clone(),
            writer: self.writer.clone(),
        }
    }

    /// Total calls made to any collaborator.
    pub fn total_calls(&self) -> usize {
        self.embedder.calls()
            + self.searcher.calls()
            + self.emissions.calls()
            + self.llm.calls()
            + self.sleeper.delays().len()
            + self.pdf.calls()
            + self.writer.calls()
    }
}

pub fn chunk(file: &str, score: f32, text: &str) -> DocumentChunkMatch {
    DocumentChunkMatch {
        source_file_name: file.into(),
        page_number: 1,
        similarity_score: score,
        text_excerpt: text.into(),
    }
}

/// `A`, a critical supplier at 100 kg against a 50 kg baseline.
pub fn supplier_hotspot() -> Hotspot {
    Hotspot {
        entity: "A".into(),
        entity_type: "supplier".into(),
        predicted_co2: 100.0,
        baseline_co2: 50.0,
        percent_above: 100.0,
        severity: "critical".into(),
        status: "active".into(),
    }
}

pub fn event(supplier: &str) -> NormalizedEvent {
    NormalizedEvent {
        supplier_id: Some(supplier.into()),
        distance_km: 120.0,
        load_kg: 800.0,
        timestamp: Some("2025-01-01T00:00:00Z".into()),
    }
}
