//! Core data models used by the library.

use serde::Serialize;
use serde_json::Value;

/// One uploaded-document chunk returned by vector search.
///
/// Built from the Qdrant payload written at ingestion time
/// (`fileName`, `page`, `textExcerpt`).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChunkMatch {
    pub source_file_name: String,
    pub page_number: u32,
    pub similarity_score: f32,
    pub text_excerpt: String,
}

impl DocumentChunkMatch {
    /// Maps a `(score, payload)` search hit.
    ///
    /// Missing keys degrade to empty strings / page 0 instead of failing the
    /// whole search; snake_case keys are accepted as well.
    pub fn from_payload(score: f32, payload: &Value) -> Self {
        let source_file_name = pick_str(payload, &["fileName", "file_name", "source"])
            .unwrap_or_default()
            .to_string();
        let text_excerpt = pick_str(payload, &["textExcerpt", "text_excerpt", "text"])
            .unwrap_or_default()
            .to_string();
        let page_number = ["page", "pageNumber", "page_number"]
            .iter()
            .find_map(|k| payload.get(*k).and_then(as_page))
            .unwrap_or(0);

        Self {
            source_file_name,
            page_number,
            similarity_score: score,
            text_excerpt,
        }
    }
}

/// Equality filter on payload fields, e.g. `("fileName", "report.pdf")`.
///
/// All conditions must hold.
#[derive(Clone, Debug, Default)]
pub struct DocFilter {
    pub equals: Vec<(String, Value)>,
}

impl DocFilter {
    pub fn file_name(name: impl Into<String>) -> Self {
        Self {
            equals: vec![("fileName".to_string(), Value::String(name.into()))],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.equals.is_empty()
    }
}

/// First `max_chars` characters of `text` followed by `...`.
pub fn clamp_excerpt(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

fn pick_str<'a>(v: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| v.get(*k).and_then(Value::as_str))
}

fn as_page(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|p| u32::try_from(p).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_camel_case_payload() {
        let m = DocumentChunkMatch::from_payload(
            0.91,
            &json!({"fileName": "esg-2024.pdf", "page": 4, "textExcerpt": "Scope 3 ..."}),
        );
        assert_eq!(m.source_file_name, "esg-2024.pdf");
        assert_eq!(m.page_number, 4);
        assert_eq!(m.text_excerpt, "Scope 3 ...");
        assert!((m.similarity_score - 0.91).abs() < f32::EPSILON);
    }

    #[test]
    fn tolerates_missing_and_odd_fields() {
        let m = DocumentChunkMatch::from_payload(0.5, &json!({"page": "7", "text": "t"}));
        assert_eq!(m.source_file_name, "");
        assert_eq!(m.page_number, 7);
        assert_eq!(m.text_excerpt, "t");

        let m = DocumentChunkMatch::from_payload(0.5, &json!({"page": -3}));
        assert_eq!(m.page_number, 0);
    }

    #[test]
    fn serializes_camel_case() {
        let m = DocumentChunkMatch::from_payload(1.0, &json!({"fileName": "a.pdf", "page": 1}));
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["sourceFileName"], "a.pdf");
        assert_eq!(v["pageNumber"], 1);
    }

    #[test]
    fn clamp_excerpt_counts_chars_not_bytes() {
        assert_eq!(clamp_excerpt("CO₂ data", 3), "CO₂...");
        assert_eq!(clamp_excerpt("ab", 150), "ab...");
    }
}
