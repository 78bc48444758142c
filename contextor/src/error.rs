//! Typed error for the contextor crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// Request rejected before any collaborator was called.
    #[error("validation error: {0}")]
    Validation(&'static str),

    /// Embedding or vector search failed.
    #[error("RAG error: {0}")]
    Rag(#[from] rag_store::RagError),

    /// Relational read failed.
    #[error("emissions store error: {0}")]
    Emissions(#[from] emissions_store::EmissionsError),

    /// The language model backend failed.
    #[error("LLM error: {0}")]
    Llm(#[from] ai_llm_service::AiLlmError),

    /// The model answered with empty or whitespace-only content.
    #[error("empty response from AI model")]
    EmptyResponse,

    /// Upload larger than the configured limit.
    #[error("file exceeds the upload limit of {limit} bytes")]
    TooLarge { limit: usize },

    /// An upload parsed fine but had no text to index.
    #[error("no extractable text in document")]
    EmptyDocument,

    /// Any other collaborator failure.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// Every generation attempt failed. Terminal; never retried further.
    #[error("failed to generate chat response after {attempts} attempts: {last_error}")]
    GenerationExhausted { attempts: u32, last_error: String },
}
