use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{ConfigError, Result, validate_http_endpoint, validate_range_f32};

/// Configuration for a single LLM profile.
///
/// # Fields
///
/// - `provider`: backend (Ollama or OpenAI-compatible).
/// - `model`: model identifier (e.g. `"llama3.1:8b"`, `"gpt-4o-mini"`).
/// - `endpoint`: base URL without the API path.
/// - `api_key`: required for OpenAI-compatible providers.
/// - `max_tokens`: generation cap, ignored for embeddings.
/// - `temperature` / `top_p`: sampling knobs.
/// - `timeout_secs`: per-request HTTP timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Checks the invariants every provider relies on.
    ///
    /// # Errors
    /// - [`ConfigError::EmptyModel`] for a blank model name
    /// - [`ConfigError::InvalidFormat`] for a non-http(s) endpoint
    /// - [`ConfigError::OutOfRange`] for temperature outside `0.0..=2.0`
    ///   or `top_p` outside `0.0..=1.0`
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("endpoint", self.endpoint.trim())?;
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0)?;
        }
        if let Some(p) = self.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::AiLlmError;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "llama3.1:8b".into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: Some(1024),
            temperature: Some(0.1),
            top_p: None,
            timeout_secs: Some(60),
        }
    }

    #[test]
    fn accepts_sane_config() {
        assert!(cfg().validate().is_ok());
    }

    #[test]
    fn rejects_blank_model_and_bad_endpoint() {
        let mut c = cfg();
        c.model = "  ".into();
        assert!(matches!(
            c.validate(),
            Err(AiLlmError::Config(ConfigError::EmptyModel))
        ));

        let mut c = cfg();
        c.endpoint = "localhost:11434".into();
        assert!(matches!(
            c.validate(),
            Err(AiLlmError::Config(ConfigError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn rejects_out_of_range_sampling() {
        let mut c = cfg();
        c.top_p = Some(1.5);
        assert!(matches!(
            c.validate(),
            Err(AiLlmError::Config(ConfigError::OutOfRange { field: "top_p", .. }))
        ));
    }
}
