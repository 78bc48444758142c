//! Shared LLM service for the carbon chat backend.
//!
//! Two logical profiles are managed by [`service_profiles::LlmServiceProfiles`]:
//! - `chat`      → text generation for answers
//! - `embedding` → query embeddings for document search
//!
//! Providers: local Ollama and any OpenAI-compatible endpoint.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::AiLlmError;
pub use health_service::HealthStatus;
pub use service_profiles::LlmServiceProfiles;
