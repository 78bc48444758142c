//! Document uploads: PDF bytes to embedded chunks in the vector store.
//!
//! [`IngestPipeline::submit`] validates the file, registers it as
//! `processing` and returns at once; extraction, chunking, embedding and the
//! store write run on a background task. The outcome is recorded per upload
//! id and read back with [`IngestPipeline::status`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rag_store::{ChunkingOptions, chunk_pages};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::cfg::ContextorConfig;
use crate::collaborators::{ChunkWriter, Embedder, PdfTextExtractor};
use crate::error::ContextorError;

/// 50 MB.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadState {
    Processing,
    Completed,
    Failed,
}

/// Snapshot of one upload, as returned by the status endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatus {
    pub id: String,
    pub file_name: String,
    pub status: UploadState,
    pub size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// RFC 3339.
    pub created_at: String,
    pub updated_at: String,
}

impl UploadStatus {
    fn processing(id: String, file_name: &str, size_bytes: usize) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id,
            file_name: file_name.to_string(),
            status: UploadState::Processing,
            size_bytes,
            pages: None,
            chunks: None,
            error: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Everything ingestion talks to.
#[derive(Clone)]
pub struct IngestCollaborators {
    pub extractor: Arc<dyn PdfTextExtractor>,
    pub embedder: Arc<dyn Embedder>,
    pub writer: Arc<dyn ChunkWriter>,
}

pub struct IngestPipeline {
    extractor: Arc<dyn PdfTextExtractor>,
    embedder: Arc<dyn Embedder>,
    writer: Arc<dyn ChunkWriter>,
    chunking: ChunkingOptions,
    max_upload_bytes: usize,
    uploads: RwLock<HashMap<String, UploadStatus>>,
}

impl IngestPipeline {
    pub fn new(c: IngestCollaborators, cfg: &ContextorConfig) -> Self {
        Self {
            extractor: c.extractor,
            embedder: c.embedder,
            writer: c.writer,
            chunking: cfg.chunking(),
            max_upload_bytes: cfg.max_upload_bytes,
            uploads: RwLock::new(HashMap::new()),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// PDF content type and a non-empty body within the size limit.
    pub fn check(&self, content_type: Option<&str>, len: usize) -> Result<(), ContextorError> {
        if !content_type.is_some_and(is_pdf) {
            return Err(ContextorError::Validation("Only PDF files are allowed"));
        }
        if len == 0 {
            return Err(ContextorError::Validation("Uploaded file is empty"));
        }
        if len > self.max_upload_bytes {
            return Err(ContextorError::TooLarge {
                limit: self.max_upload_bytes,
            });
        }
        Ok(())
    }

    /// Accepts an upload and starts indexing it in the background.
    ///
    /// Rejected files are never registered and touch no collaborator.
    pub async fn submit(
        self: &Arc<Self>,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<UploadStatus, ContextorError> {
        self.check(content_type, bytes.len())?;

        let status = UploadStatus::processing(Uuid::new_v4().to_string(), file_name, bytes.len());
        self.uploads
            .write()
            .await
            .insert(status.id.clone(), status.clone());
        info!(upload_id = %status.id, file_name, size = bytes.len(), "upload accepted");

        let this = Arc::clone(self);
        let id = status.id.clone();
        let name = file_name.to_string();
        tokio::spawn(async move { this.process(&id, &name, bytes).await });

        Ok(status)
    }

    pub async fn status(&self, id: &str) -> Option<UploadStatus> {
        self.uploads.read().await.get(id).cloned()
    }

    /// Runs ingestion for a registered upload and records the outcome.
    #[instrument(skip(self, bytes))]
    async fn process(&self, id: &str, file_name: &str, bytes: Vec<u8>) {
        let outcome = self.ingest(id, file_name, bytes).await;

        let mut uploads = self.uploads.write().await;
        let Some(entry) = uploads.get_mut(id) else {
            return;
        };
        entry.updated_at = Utc::now().to_rfc3339();
        match outcome {
            Ok((pages, chunks)) => {
                info!(pages, chunks, "upload indexed");
                entry.status = UploadState::Completed;
                entry.pages = Some(pages);
                entry.chunks = Some(chunks);
            }
            Err(e) => {
                error!(error = %e, "upload failed");
                entry.status = UploadState::Failed;
                entry.error = Some(e.to_string());
            }
        }
    }

    async fn ingest(
        &self,
        id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(usize, u64), ContextorError> {
        let extractor = Arc::clone(&self.extractor);
        let pages = tokio::task::spawn_blocking(move || extractor.extract_pages(&bytes))
            .await
            .map_err(|e| ContextorError::Unavailable(format!("pdf extraction task: {e}")))??;

        let chunks = chunk_pages(file_name, &pages, self.chunking);
        if chunks.is_empty() {
            return Err(ContextorError::EmptyDocument);
        }

        let mut vectors = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            vectors.push(self.embedder.embed(&chunk.text).await?);
        }

        let written = self.writer.write(id, &chunks, vectors).await?;
        Ok((pages.len(), written))
    }
}

/// Media type essence match, ignoring parameters and case.
fn is_pdf(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use std::time::Duration;

    fn pipeline(fx: &Fixture) -> Arc<IngestPipeline> {
        Arc::new(IngestPipeline::new(
            fx.ingest_collaborators(),
            &ContextorConfig::default(),
        ))
    }

    async fn settled(p: &IngestPipeline, id: &str) -> UploadStatus {
        for _ in 0..200 {
            match p.status(id).await {
                Some(s) if s.status != UploadState::Processing => return s,
                _ => tokio::time::sleep(Duration::from_millis(5)).await,
            }
        }
        panic!("upload {id} never settled");
    }

    #[tokio::test]
    async fn indexes_every_page_with_text() {
        let fx = Fixture::default();
        fx.pdf.set_pages(&["Scope 1 fleet fuel", "", "Scope 3 purchased goods"]);
        let p = pipeline(&fx);

        let accepted = p
            .submit("esg.pdf", Some("application/pdf"), b"%PDF-1.7".to_vec())
            .await
            .unwrap();
        assert_eq!(accepted.status, UploadState::Processing);
        assert_eq!(accepted.size_bytes, 8);

        let done = settled(&p, &accepted.id).await;
        assert_eq!(done.status, UploadState::Completed);
        assert_eq!(done.pages, Some(3));
        assert_eq!(done.chunks, Some(2));
        assert!(done.error.is_none());

        let batches = fx.writer.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].upload_id, accepted.id);
        assert_eq!(batches[0].vectors, 2);
        let pages: Vec<_> = batches[0].chunks.iter().map(|c| c.page).collect();
        assert_eq!(pages, [1, 3]);
        assert_eq!(batches[0].chunks[1].file_name, "esg.pdf");
        assert_eq!(fx.embedder.calls(), 2);
    }

    #[tokio::test]
    async fn rejects_non_pdf_and_oversize_without_side_effects() {
        let fx = Fixture::default();
        let mut cfg = ContextorConfig::default();
        cfg.max_upload_bytes = 4;
        let p = Arc::new(IngestPipeline::new(fx.ingest_collaborators(), &cfg));

        let err = p
            .submit("notes.txt", Some("text/plain"), b"hi".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, ContextorError::Validation("Only PDF files are allowed")));

        let err = p.submit("a.pdf", None, b"hi".to_vec()).await.unwrap_err();
        assert!(matches!(err, ContextorError::Validation(_)));

        let err = p
            .submit("big.pdf", Some("application/pdf"), vec![0; 5])
            .await
            .unwrap_err();
        assert!(matches!(err, ContextorError::TooLarge { limit: 4 }));

        let err = p
            .submit("empty.pdf", Some("application/pdf"), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ContextorError::Validation("Uploaded file is empty")));

        assert_eq!(fx.total_calls(), 0);
        assert!(p.uploads.read().await.is_empty());
    }

    #[test]
    fn content_type_match_ignores_case_and_parameters() {
        assert!(is_pdf("application/pdf"));
        assert!(is_pdf("Application/PDF; name=a.pdf"));
        assert!(!is_pdf("application/pdfx"));
        assert!(!is_pdf("text/plain"));
    }

    #[tokio::test]
    async fn unreadable_pdf_is_marked_failed() {
        let fx = Fixture::default();
        fx.pdf.fail();
        let p = pipeline(&fx);

        let accepted = p
            .submit("broken.pdf", Some(PDF_CONTENT_TYPE), b"nope".to_vec())
            .await
            .unwrap();
        let done = settled(&p, &accepted.id).await;
        assert_eq!(done.status, UploadState::Failed);
        assert!(done.error.is_some());
        assert_eq!(fx.embedder.calls(), 0);
        assert!(fx.writer.batches().is_empty());
    }

    #[tokio::test]
    async fn scanned_pdf_without_text_is_marked_failed() {
        let fx = Fixture::default();
        fx.pdf.set_pages(&["  ", "\n"]);
        let p = pipeline(&fx);

        let accepted = p
            .submit("scan.pdf", Some(PDF_CONTENT_TYPE), b"%PDF".to_vec())
            .await
            .unwrap();
        let done = settled(&p, &accepted.id).await;
        assert_eq!(done.status, UploadState::Failed);
        assert_eq!(done.error.as_deref(), Some("no extractable text in document"));
        assert_eq!(fx.writer.calls(), 0);
    }

    #[tokio::test]
    async fn embedding_outage_skips_the_write() {
        let fx = Fixture::default();
        fx.pdf.set_pages(&["Scope 2 electricity"]);
        fx.embedder.fail();
        let p = pipeline(&fx);

        let accepted = p
            .submit("e.pdf", Some(PDF_CONTENT_TYPE), b"%PDF".to_vec())
            .await
            .unwrap();
        let done = settled(&p, &accepted.id).await;
        assert_eq!(done.status, UploadState::Failed);
        assert_eq!(fx.writer.calls(), 0);
    }

    #[tokio::test]
    async fn store_failure_is_recorded() {
        let fx = Fixture::default();
        fx.pdf.set_pages(&["Scope 2 electricity"]);
        fx.writer.fail();
        let p = pipeline(&fx);

        let accepted = p
            .submit("e.pdf", Some(PDF_CONTENT_TYPE), b"%PDF".to_vec())
            .await
            .unwrap();
        let done = settled(&p, &accepted.id).await;
        assert_eq!(done.status, UploadState::Failed);
        assert_eq!(done.error.as_deref(), Some("collaborator unavailable: vector store is down"));
    }

    #[tokio::test]
    async fn unknown_upload_has_no_status() {
        let p = pipeline(&Fixture::default());
        assert!(p.status("missing").await.is_none());
    }
}
