use std::sync::Arc;

use ai_llm_service::{
    AiLlmError, LlmServiceProfiles,
    config::default_config::{config_chat, config_embedding},
};
use contextor::{
    ChatPipeline, Collaborators, ContextorConfig, IngestCollaborators, IngestPipeline,
    LlmAnswerGenerator, PdfExtractReader, TokioSleeper,
};
use emissions_store::{EmissionsClient, EmissionsConfig, EmissionsError};
use rag_store::{DocumentStore, LlmEmbedder, RagConfig, RagError};
use thiserror::Error;
use tracing::info;

/// Startup failures while wiring collaborators from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("LLM configuration: {0}")]
    Llm(#[from] AiLlmError),

    #[error("document store configuration: {0}")]
    Rag(#[from] RagError),

    #[error("emissions store configuration: {0}")]
    Emissions(#[from] EmissionsError),
}

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub pipeline: ChatPipeline,
    /// PDF uploads and their status.
    pub ingest: Arc<IngestPipeline>,
    /// Chat + embedding profiles, probed by `/health`.
    pub llm_profiles: Arc<LlmServiceProfiles>,
}

impl AppState {
    pub fn new(
        pipeline: ChatPipeline,
        ingest: Arc<IngestPipeline>,
        llm_profiles: Arc<LlmServiceProfiles>,
    ) -> Self {
        Self {
            pipeline,
            ingest,
            llm_profiles,
        }
    }

    /// Builds every production collaborator from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let llm_profiles = Arc::new(LlmServiceProfiles::new(
            config_chat()?,
            config_embedding()?,
            Some(10),
        )?);

        let rag_cfg = RagConfig::from_env()?;
        let embedder = LlmEmbedder::new(llm_profiles.clone(), rag_cfg.embedding_dim);
        info!(
            collection = %rag_cfg.collection,
            qdrant_url = %rag_cfg.qdrant_url,
            "document store configured"
        );
        let documents = Arc::new(DocumentStore::new(rag_cfg)?);
        let embedder = Arc::new(embedder);

        let emissions = EmissionsClient::new(EmissionsConfig::from_env()?)?;

        let collaborators = Collaborators {
            embedder: embedder.clone(),
            searcher: documents.clone(),
            emissions: Arc::new(emissions),
            llm: Arc::new(LlmAnswerGenerator::new(llm_profiles.clone())),
            sleeper: Arc::new(TokioSleeper),
        };
        let cfg = ContextorConfig::from_env();
        info!(
            max_attempts = cfg.max_attempts,
            retry_delay_ms = cfg.retry_delay_ms,
            "chat pipeline configured"
        );

        let ingest = IngestPipeline::new(
            IngestCollaborators {
                extractor: Arc::new(PdfExtractReader),
                embedder,
                writer: documents,
            },
            &cfg,
        );
        info!(
            max_upload_bytes = cfg.max_upload_bytes,
            chunk_max_chars = cfg.chunk_max_chars,
            "upload ingestion configured"
        );

        Ok(Self::new(
            ChatPipeline::new(collaborators, &cfg),
            Arc::new(ingest),
            llm_profiles,
        ))
    }
}
