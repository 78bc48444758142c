//! Request/response types shared with the HTTP layer.

use serde::{Deserialize, Serialize};

/// Body of `POST /chat`.
///
/// `message` is optional at the type level so that a missing field is
/// reported as a validation error, same as an empty one.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Free-form tag from the UI; not used for retrieval.
    #[serde(default)]
    pub context: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            context: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub has_document_context: bool,
    pub has_emissions_context: bool,
    /// Set only on the fallback path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /query`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default)]
    pub question: Option<String>,
    /// Overrides the configured K when greater than zero.
    #[serde(default)]
    pub top_k: Option<u64>,
    /// Restricts the search to one uploaded file.
    #[serde(default)]
    pub file_name: Option<String>,
}

/// A source chunk the answer was grounded on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub file_name: String,
    pub page: u32,
    pub score: f32,
    /// First 150 characters of the chunk, followed by `...`.
    pub excerpt: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_field_is_omitted_when_absent() {
        let r = ChatResponse {
            response: "Hello".into(),
            has_document_context: false,
            has_emissions_context: true,
            error: None,
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "response": "Hello",
                "hasDocumentContext": false,
                "hasEmissionsContext": true
            })
        );
    }

    #[test]
    fn missing_message_deserializes_as_none() {
        let r: ChatRequest = serde_json::from_str(r#"{"context":"dashboard"}"#).unwrap();
        assert!(r.message.is_none());
        assert_eq!(r.context.as_deref(), Some("dashboard"));

        let q: QueryRequest =
            serde_json::from_str(r#"{"question":"q","topK":2,"fileName":"a.pdf"}"#).unwrap();
        assert_eq!(q.top_k, Some(2));
        assert_eq!(q.file_name.as_deref(), Some("a.pdf"));
    }
}
