//! Filter conversion to Qdrant `Filter`.
//!
//! Supports exact equality on scalar fields (`String`, integer `Number`, `Bool`).

use crate::record::DocFilter;
use qdrant_client::qdrant::{
    Condition, FieldCondition, Filter, Match, condition::ConditionOneOf, r#match::MatchValue,
};
use tracing::debug;

/// Converts [`DocFilter`] to a Qdrant [`Filter`] where every condition is in `must`.
///
/// Unsupported value types (floats, arrays, objects, null) are skipped.
pub fn to_qdrant_filter(f: &DocFilter) -> Filter {
    debug!("filters::to_qdrant_filter equals={}", f.equals.len());

    let must = f
        .equals
        .iter()
        .filter_map(|(field, val)| {
            let value = match val {
                serde_json::Value::String(s) => MatchValue::Keyword(s.clone()),
                serde_json::Value::Number(n) => MatchValue::Integer(n.as_i64()?),
                serde_json::Value::Bool(b) => MatchValue::Boolean(*b),
                _ => return None,
            };
            Some(Condition {
                condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
                    key: field.clone(),
                    r#match: Some(Match {
                        match_value: Some(value),
                    }),
                    ..Default::default()
                })),
            })
        })
        .collect();

    Filter {
        must,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_name_filter_becomes_single_must_keyword() {
        let f = to_qdrant_filter(&DocFilter::file_name("report.pdf"));
        assert_eq!(f.must.len(), 1);
        assert!(f.should.is_empty());
        match &f.must[0].condition_one_of {
            Some(ConditionOneOf::Field(fc)) => {
                assert_eq!(fc.key, "fileName");
                assert_eq!(
                    fc.r#match.as_ref().and_then(|m| m.match_value.clone()),
                    Some(MatchValue::Keyword("report.pdf".into()))
                );
            }
            other => panic!("unexpected condition: {other:?}"),
        }
    }

    #[test]
    fn unsupported_values_are_skipped() {
        let f = to_qdrant_filter(&DocFilter {
            equals: vec![
                ("page".into(), json!(3)),
                ("score".into(), json!(0.5)),
                ("tags".into(), json!(["a"])),
            ],
        });
        assert_eq!(f.must.len(), 1);
    }
}
