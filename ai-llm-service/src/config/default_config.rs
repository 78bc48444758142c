//! LLM profiles loaded strictly from environment variables.
//!
//! Two roles are needed by the chat backend:
//!
//! - **Chat**      → answers questions (low temperature, bounded output)
//! - **Embedding** → vectors for document search
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`        = `ollama` (default) or `openai`
//! - `CHAT_MODEL`      = generation model (mandatory)
//! - `EMBEDDING_MODEL` = embedding model (mandatory)
//! - `LLM_MAX_TOKENS`  = optional max tokens (u32, default 1024)
//! - `LLM_TEMPERATURE` = optional temperature (f32, default 0.1)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY` (mandatory)
//! - `OPENAI_URL` (default `https://api.openai.com`)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, env_opt_f32, env_opt_u32, must_env},
};

const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Ok(url) = std::env::var("OLLAMA_URL") {
        if !url.trim().is_empty() {
            return Ok(url);
        }
    }
    if let Ok(port) = std::env::var("OLLAMA_PORT") {
        if !port.trim().is_empty() {
            let _ = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "OLLAMA_PORT",
                    reason: "expected u16 (1..=65535)",
                })?;
            return Ok(format!("http://localhost:{}", port.trim()));
        }
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

/// Reads `LLM_KIND`, defaulting to Ollama.
pub fn provider_from_env() -> Result<LlmProvider, AiLlmError> {
    match std::env::var("LLM_KIND") {
        Ok(v) if !v.trim().is_empty() => Ok(v.parse::<LlmProvider>()?),
        _ => Ok(LlmProvider::Ollama),
    }
}

/// Endpoint and key for the given provider.
fn endpoint_and_key(provider: LlmProvider) -> Result<(String, Option<String>), AiLlmError> {
    match provider {
        LlmProvider::Ollama => Ok((ollama_endpoint()?, None)),
        LlmProvider::OpenAI => {
            let key = must_env("OPENAI_API_KEY")?;
            let url = std::env::var("OPENAI_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
            Ok((url, Some(key)))
        }
    }
}

/// Constructs the **chat** profile.
///
/// # Defaults
/// - `temperature = 0.1`
/// - `max_tokens = 1024`
/// - `timeout_secs = 120`
pub fn config_chat() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env()?;
    let (endpoint, api_key) = endpoint_and_key(provider)?;
    let model = must_env("CHAT_MODEL")?;
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_TOKENS);
    let temperature = env_opt_f32("LLM_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE);

    let cfg = LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: Some(max_tokens),
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(120),
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Constructs the **embedding** profile.
///
/// # Defaults
/// - `temperature = 0.0` (deterministic)
/// - `timeout_secs = 30`
pub fn config_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env()?;
    let (endpoint, api_key) = endpoint_and_key(provider)?;
    let model = must_env("EMBEDDING_MODEL")?;

    let cfg = LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(30),
    };
    cfg.validate()?;
    Ok(cfg)
}
