//! Carbon Intelligence chat pipeline.
//!
//! A chat turn runs three stages, strictly in order:
//!
//! 1. [`ContextRetriever`]: document excerpts (embedding + vector search) and
//!    an emissions summary (three relational reads). Failing sources degrade
//!    to empty context.
//! 2. [`prompt::assemble_prompt`]: fixed preamble plus whichever context is
//!    present.
//! 3. [`generate::generate_answer`]: bounded retry over the language model.
//!
//! [`ChatPipeline`] ties them together and turns exhausted generation into a
//! fallback answer. It also serves document Q&A with citations.
//!
//! [`IngestPipeline`] fills the document collection those reads search:
//! uploaded PDFs are chunked, embedded and written in the background.

pub mod adapters;
pub mod api_types;
pub mod cfg;
pub mod collaborators;
mod error;
pub mod generate;
pub mod ingest;
mod pipeline;
pub mod prompt;
pub mod retrieve;
pub mod summary;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use adapters::{LlmAnswerGenerator, PdfExtractReader};
pub use api_types::{ChatRequest, ChatResponse, Citation, QueryAnswer, QueryRequest};
pub use cfg::ContextorConfig;
pub use collaborators::{
    AnswerGenerator, ChunkWriter, Embedder, EmissionsReader, PdfTextExtractor, Sleeper,
    TokioSleeper, VectorSearcher,
};
pub use error::ContextorError;
pub use generate::RetryPolicy;
pub use ingest::{
    IngestCollaborators, IngestPipeline, MAX_UPLOAD_BYTES, UploadState, UploadStatus,
};
pub use pipeline::{
    ChatPipeline, Collaborators, FALLBACK_ERROR, FALLBACK_RESPONSE, NO_SOURCES_ANSWER, fallback,
};
pub use retrieve::{ContextRetriever, ContextSource, RetrievalLimits, RetrievedContext};
