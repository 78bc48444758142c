//! Text rendering of the emissions snapshot.
//!
//! Output is deterministic for identical rows. Each function returns the
//! paragraphs it contributes; an empty input contributes nothing.

use emissions_store::{Hotspot, NormalizedEvent, Recommendation};

const MAX_SUPPLIER_HOTSPOTS: usize = 5;
const MAX_OTHER_HOTSPOTS: usize = 3;

/// Totals line, then top supplier emitters, then other hotspots.
pub fn hotspot_paragraphs(hotspots: &[Hotspot]) -> Vec<String> {
    if hotspots.is_empty() {
        return Vec::new();
    }

    let total_predicted: f64 = hotspots.iter().map(|h| h.predicted_co2).sum();
    let total_baseline: f64 = hotspots.iter().map(|h| h.baseline_co2).sum();
    let avg_predicted = total_predicted / hotspots.len() as f64;

    let mut out = vec![format!(
        "Current Emissions Status: {} active hotspots with total predicted emissions of {:.2} kg CO₂ \
         (baseline: {:.2} kg CO₂, average per hotspot: {:.2} kg CO₂)",
        hotspots.len(),
        total_predicted,
        total_baseline,
        avg_predicted
    )];

    let (suppliers, others): (Vec<&Hotspot>, Vec<&Hotspot>) =
        hotspots.iter().partition(|h| h.is_supplier());

    if !suppliers.is_empty() {
        let listed = suppliers
            .iter()
            .take(MAX_SUPPLIER_HOTSPOTS)
            .map(|h| {
                format!(
                    "{} ({}: {:.2} kg CO₂, {:.1}% above baseline)",
                    h.entity,
                    h.severity.to_uppercase(),
                    h.predicted_co2,
                    h.percent_above
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        out.push(format!("Top Supplier Emitters: {listed}"));
    }

    if !others.is_empty() {
        let listed = others
            .iter()
            .take(MAX_OTHER_HOTSPOTS)
            .map(|h| {
                format!(
                    "{} [{}] ({}: {:.2} kg CO₂)",
                    h.entity,
                    h.entity_type,
                    h.severity.to_uppercase(),
                    h.predicted_co2
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        out.push(format!("Other Hotspots: {listed}"));
    }

    out
}

/// Pending recommendations with their combined reduction potential.
pub fn recommendation_paragraph(recs: &[Recommendation]) -> Option<String> {
    if recs.is_empty() {
        return None;
    }
    let total: f64 = recs.iter().map(|r| r.co2_reduction).sum();
    let listed = recs
        .iter()
        .map(|r| {
            format!(
                "\"{}\" ({} kg CO₂ reduction, {:.0}% confidence)",
                r.title,
                r.co2_reduction,
                r.confidence * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join("; ");
    Some(format!(
        "Pending Recommendations (Total potential reduction: {total:.2} kg CO₂): {listed}"
    ))
}

/// Event count and distinct suppliers, in first-seen order.
pub fn activity_paragraph(events: &[NormalizedEvent]) -> Option<String> {
    if events.is_empty() {
        return None;
    }
    let mut suppliers: Vec<&str> = Vec::new();
    for id in events.iter().filter_map(|e| e.supplier_id.as_deref()) {
        if !suppliers.contains(&id) {
            suppliers.push(id);
        }
    }
    Some(format!(
        "Recent Activity: {} events from {} suppliers ({})",
        events.len(),
        suppliers.len(),
        suppliers.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotspot(entity: &str, kind: &str, pred: f64, base: f64, pct: f64, sev: &str) -> Hotspot {
        Hotspot {
            entity: entity.into(),
            entity_type: kind.into(),
            predicted_co2: pred,
            baseline_co2: base,
            percent_above: pct,
            severity: sev.into(),
            status: "active".into(),
        }
    }

    #[test]
    fn single_critical_supplier() {
        let out = hotspot_paragraphs(&[hotspot("A", "supplier", 100.0, 50.0, 100.0, "critical")]);
        assert_eq!(out.len(), 2);
        assert!(out[0].contains("1 active hotspots"));
        assert!(out[0].contains("100.00 kg CO₂"));
        assert!(out[0].contains("baseline: 50.00 kg CO₂"));
        assert_eq!(
            out[1],
            "Top Supplier Emitters: A (CRITICAL: 100.00 kg CO₂, 100.0% above baseline)"
        );
    }

    #[test]
    fn partitions_and_caps_by_entity_type() {
        let mut rows: Vec<Hotspot> = (0..7)
            .map(|i| hotspot(&format!("S{i}"), "supplier", 10.0, 5.0, 100.0, "high"))
            .collect();
        rows.extend((0..4).map(|i| hotspot(&format!("R{i}"), "route", 2.5, 1.0, 150.0, "low")));

        let out = hotspot_paragraphs(&rows);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].matches("HIGH").count(), 5);
        assert_eq!(
            out[2],
            "Other Hotspots: R0 [route] (LOW: 2.50 kg CO₂); R1 [route] (LOW: 2.50 kg CO₂); \
             R2 [route] (LOW: 2.50 kg CO₂)"
        );
    }

    #[test]
    fn averages_over_all_hotspots() {
        let out = hotspot_paragraphs(&[
            hotspot("X", "facility", 30.0, 10.0, 200.0, "medium"),
            hotspot("Y", "facility", 10.0, 10.0, 0.0, "low"),
        ]);
        assert!(out[0].contains("total predicted emissions of 40.00 kg CO₂"));
        assert!(out[0].contains("average per hotspot: 20.00 kg CO₂"));
        assert!(!out.iter().any(|p| p.starts_with("Top Supplier")));
    }

    #[test]
    fn recommendations_format() {
        let recs = vec![
            Recommendation {
                title: "Switch to rail".into(),
                co2_reduction: 120.0,
                confidence: 0.87,
                status: "pending".into(),
            },
            Recommendation {
                title: "Consolidate loads".into(),
                co2_reduction: 12.5,
                confidence: 0.6,
                status: "pending".into(),
            },
        ];
        assert_eq!(
            recommendation_paragraph(&recs).unwrap(),
            "Pending Recommendations (Total potential reduction: 132.50 kg CO₂): \
             \"Switch to rail\" (120 kg CO₂ reduction, 87% confidence); \
             \"Consolidate loads\" (12.5 kg CO₂ reduction, 60% confidence)"
        );
        assert!(recommendation_paragraph(&[]).is_none());
    }

    #[test]
    fn exact_ties_round_half_to_even() {
        let out = hotspot_paragraphs(&[hotspot("T", "supplier", 1.0, 1.0, 12.25, "high")]);
        assert!(out[1].ends_with("12.2% above baseline)"), "{}", out[1]);

        let rec = Recommendation {
            title: "Idle cut".into(),
            co2_reduction: 1.0,
            confidence: 0.125,
            status: "pending".into(),
        };
        let text = recommendation_paragraph(&[rec]).unwrap();
        assert!(text.ends_with("12% confidence)"), "{text}");
    }

    #[test]
    fn activity_lists_distinct_suppliers_in_order() {
        let ev = |id: Option<&str>| NormalizedEvent {
            supplier_id: id.map(str::to_string),
            ..Default::default()
        };
        let events = vec![ev(Some("S2")), ev(Some("S1")), ev(Some("S2")), ev(None)];
        assert_eq!(
            activity_paragraph(&events).unwrap(),
            "Recent Activity: 4 events from 2 suppliers (S2, S1)"
        );
        assert!(activity_paragraph(&[]).is_none());
    }
}
