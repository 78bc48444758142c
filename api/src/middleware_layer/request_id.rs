//! `X-Request-Id` propagation.
//!
//! Reuses the caller's id when present, otherwise mints `req-{unix nanos}`.
//! The id is echoed on the response and attached to a tracing span that
//! covers the whole request.

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{Instrument, info, info_span};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

fn existing_id(req: &Request<Body>) -> Option<HeaderValue> {
    req.headers()
        .get(&REQUEST_ID_HEADER)
        .filter(|v| v.to_str().is_ok_and(|s| !s.trim().is_empty()))
        .cloned()
}

fn new_id() -> HeaderValue {
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    HeaderValue::from_str(&format!("req-{nanos}"))
        .unwrap_or_else(|_| HeaderValue::from_static("req-unknown"))
}

pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = existing_id(&req).unwrap_or_else(new_id);
    req.headers_mut().insert(REQUEST_ID_HEADER, id.clone());

    let span = info_span!(
        "http",
        request_id = %id.to_str().unwrap_or_default(),
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let started = std::time::Instant::now();
        let mut res = next.run(req).await;
        info!(
            status = res.status().as_u16(),
            latency_ms = started.elapsed().as_millis(),
            "request completed"
        );
        res.headers_mut().insert(REQUEST_ID_HEADER, id);
        res
    }
    .instrument(span)
    .await
}
