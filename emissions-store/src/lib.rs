//! Read-only access to the emissions tables (hotspots, recommendations,
//! normalized events) over PostgREST.

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod query;

pub use client::EmissionsClient;
pub use config::EmissionsConfig;
pub use errors::{EmissionsError, EmissionsResult};
pub use models::{Hotspot, NormalizedEvent, Recommendation};
