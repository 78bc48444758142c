//! PostgREST client for the emissions tables.
//!
//! Tables read (all `GET {base}/rest/v1/{table}`):
//!   * `hotspots`           ?status=eq.active&order=predicted_co2.desc
//!   * `recommendations`    ?status=eq.pending&order=confidence.desc
//!   * `events_normalized`  ?select=supplier_id,distance_km,load_kg,timestamp&order=timestamp.desc

use std::time::Duration;

use reqwest::{Client, header};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::EmissionsConfig;
use crate::errors::{EmissionsError, EmissionsResult, from_status};
use crate::models::{Hotspot, NormalizedEvent, Recommendation};
use crate::query::TableQuery;

pub const HOTSPOTS_TABLE: &str = "hotspots";
pub const RECOMMENDATIONS_TABLE: &str = "recommendations";
pub const EVENTS_TABLE: &str = "events_normalized";

/// Read-only HTTP client; cheap to clone.
#[derive(Debug, Clone)]
pub struct EmissionsClient {
    http: Client,
    rest_url: String,
}

impl EmissionsClient {
    /// Builds a client with `apikey` and bearer headers preset.
    pub fn new(cfg: EmissionsConfig) -> EmissionsResult<Self> {
        cfg.validate()?;

        let mut headers = header::HeaderMap::new();
        let mut key = header::HeaderValue::from_str(&cfg.api_key)
            .map_err(|e| EmissionsError::Config(format!("invalid SUPABASE_KEY header: {e}")))?;
        key.set_sensitive(true);
        let mut bearer = header::HeaderValue::from_str(&format!("Bearer {}", cfg.api_key))
            .map_err(|e| EmissionsError::Config(format!("invalid SUPABASE_KEY header: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert("apikey", key);
        headers.insert(header::AUTHORIZATION, bearer);
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()?;

        let rest_url = cfg.rest_url();
        debug!("Creating EmissionsClient with rest_url={}", rest_url);
        Ok(Self { http, rest_url })
    }

    /// Active hotspots, highest predicted CO2 first.
    pub async fn active_hotspots(&self, limit: usize) -> EmissionsResult<Vec<Hotspot>> {
        self.fetch(&hotspots_query(limit)).await
    }

    /// Pending recommendations, most confident first.
    pub async fn pending_recommendations(
        &self,
        limit: usize,
    ) -> EmissionsResult<Vec<Recommendation>> {
        self.fetch(&recommendations_query(limit)).await
    }

    /// Most recent normalized events.
    pub async fn recent_events(&self, limit: usize) -> EmissionsResult<Vec<NormalizedEvent>> {
        self.fetch(&events_query(limit)).await
    }

    async fn fetch<T: DeserializeOwned>(&self, q: &TableQuery) -> EmissionsResult<Vec<T>> {
        let url = format!("{}/{}", self.rest_url, q.table);
        debug!(table = q.table, "GET {}", url);

        let resp = self.http.get(&url).query(&q.params()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(240).collect();
            warn!(table = q.table, status = status.as_u16(), "PostgREST returned non-success status");
            return Err(from_status(status.as_u16(), snippet));
        }

        resp.json::<Vec<T>>()
            .await
            .map_err(|e| EmissionsError::InvalidResponse(format!("{}: {e}", q.table)))
    }
}

fn hotspots_query(limit: usize) -> TableQuery {
    TableQuery::table(HOTSPOTS_TABLE)
        .eq("status", "active")
        .order_desc("predicted_co2")
        .limit(limit)
}

fn recommendations_query(limit: usize) -> TableQuery {
    TableQuery::table(RECOMMENDATIONS_TABLE)
        .eq("status", "pending")
        .order_desc("confidence")
        .limit(limit)
}

fn events_query(limit: usize) -> TableQuery {
    TableQuery::table(EVENTS_TABLE)
        .select(&["supplier_id", "distance_km", "load_kg", "timestamp"])
        .order_desc("timestamp")
        .limit(limit)
}
