//! Row types for the three tables the chat assistant reads.
//!
//! Numeric columns are nullable in the database; nulls decode as `0.0` so that
//! sums and averages treat them as zero.

use serde::{Deserialize, Deserializer, Serialize};

/// An emissions hotspot detected by the orchestration engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    #[serde(default, deserialize_with = "null_default")]
    pub entity: String,
    #[serde(default, deserialize_with = "null_default")]
    pub entity_type: String,
    #[serde(default, deserialize_with = "null_default")]
    pub predicted_co2: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub baseline_co2: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub percent_above: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub severity: String,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
}

impl Hotspot {
    pub fn is_supplier(&self) -> bool {
        self.entity_type == "supplier"
    }
}

/// A reduction recommendation produced by the ML engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub co2_reduction: f64,
    /// Model confidence in `0.0..=1.0`.
    #[serde(default, deserialize_with = "null_default")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
}

/// A shipment/activity event after normalization by the data core.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    #[serde(default, deserialize_with = "string_or_number")]
    pub supplier_id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub distance_km: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub load_kg: f64,
    #[serde(default)]
    pub timestamp: Option<String>,
}

fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Supplier ids are text in some deployments and integers in others.
fn string_or_number<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(d)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_decode_as_defaults() {
        let h: Hotspot = serde_json::from_str(
            r#"{"entity":"ACME","entity_type":"supplier","predicted_co2":null,
                "baseline_co2":50,"percent_above":null,"severity":"warn","status":"active",
                "id":"ignored"}"#,
        )
        .unwrap();
        assert_eq!(h.predicted_co2, 0.0);
        assert_eq!(h.baseline_co2, 50.0);
        assert!(h.is_supplier());
    }

    #[test]
    fn supplier_id_accepts_numbers() {
        let e: NormalizedEvent =
            serde_json::from_str(r#"{"supplier_id":42,"distance_km":10.5,"load_kg":null}"#).unwrap();
        assert_eq!(e.supplier_id.as_deref(), Some("42"));
        assert_eq!(e.load_kg, 0.0);

        let e: NormalizedEvent = serde_json::from_str(r#"{"supplier_id":null}"#).unwrap();
        assert!(e.supplier_id.is_none());
    }
}
