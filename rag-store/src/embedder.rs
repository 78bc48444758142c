//! Query embedder backed by the shared LLM service.

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use tracing::warn;

use crate::RagError;

/// Embeds query text with the `embedding` profile of [`LlmServiceProfiles`].
///
/// When `dim` is set, vectors of any other size are rejected: searching a
/// collection with a wrong-sized vector fails anyway, just less clearly.
#[derive(Clone, Debug)]
pub struct LlmEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: Option<usize>,
}

impl LlmEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>, dim: Option<usize>) -> Self {
        Self { svc, dim }
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let v = self.svc.embed(text).await?;
        check_dim(v, self.dim)
    }
}

fn check_dim(v: Vec<f32>, want: Option<usize>) -> Result<Vec<f32>, RagError> {
    match want {
        Some(want) if v.len() != want => {
            warn!(got = v.len(), want, "embedding size mismatch");
            Err(RagError::VectorSizeMismatch { got: v.len(), want })
        }
        _ => Ok(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_check() {
        assert!(check_dim(vec![0.0; 4], None).is_ok());
        assert!(check_dim(vec![0.0; 4], Some(4)).is_ok());
        assert!(matches!(
            check_dim(vec![0.0; 3], Some(4)),
            Err(RagError::VectorSizeMismatch { got: 3, want: 4 })
        ));
    }
}
