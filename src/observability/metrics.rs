//! Session metrics
//!
//! Counters and histograms for catalog traffic, decisions and persistence.
//! Recording is a no-op until a recorder is installed, so library code can
//! call these unconditionally.

use crate::common::error::{Result, SwipeError};
use ::metrics::{counter, describe_counter, describe_histogram, histogram};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing::info;

pub const DECISIONS_TOTAL: &str = "swipe_decisions_total";
pub const CATALOG_REQUESTS_TOTAL: &str = "swipe_catalog_requests_total";
pub const CATALOG_REQUEST_FAILURES_TOTAL: &str = "swipe_catalog_request_failures_total";
pub const CATALOG_REQUEST_DURATION_SECONDS: &str = "swipe_catalog_request_duration_seconds";
pub const PERSISTENCE_ERRORS_TOTAL: &str = "swipe_persistence_errors_total";
pub const STALE_RESPONSES_TOTAL: &str = "swipe_stale_responses_total";

pub const ALL_METRICS: [&str; 6] = [
    DECISIONS_TOTAL,
    CATALOG_REQUESTS_TOTAL,
    CATALOG_REQUEST_FAILURES_TOTAL,
    CATALOG_REQUEST_DURATION_SECONDS,
    PERSISTENCE_ERRORS_TOTAL,
    STALE_RESPONSES_TOTAL,
];

static INSTALLED: OnceLock<SocketAddr> = OnceLock::new();

/// Kind of catalog request, also used to key request generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Search,
    LoadMore,
    Detail,
}

impl FetchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchKind::Search => "search",
            FetchKind::LoadMore => "load_more",
            FetchKind::Detail => "detail",
        }
    }
}

pub struct SessionMetrics;

impl SessionMetrics {
    pub fn record_fetch(kind: FetchKind, status: u16, duration_secs: f64) {
        counter!(CATALOG_REQUESTS_TOTAL, "kind" => kind.as_str(), "status" => status.to_string())
            .increment(1);
        histogram!(CATALOG_REQUEST_DURATION_SECONDS, "kind" => kind.as_str()).record(duration_secs);
    }

    pub fn record_fetch_failure(kind: FetchKind) {
        counter!(CATALOG_REQUEST_FAILURES_TOTAL, "kind" => kind.as_str()).increment(1);
    }

    pub fn record_decision(decision: &'static str) {
        counter!(DECISIONS_TOTAL, "decision" => decision).increment(1);
    }

    pub fn record_persistence_error(slot: &str) {
        counter!(PERSISTENCE_ERRORS_TOTAL, "slot" => slot.to_string()).increment(1);
    }

    pub fn record_stale_response(kind: FetchKind) {
        counter!(STALE_RESPONSES_TOTAL, "kind" => kind.as_str()).increment(1);
    }
}

fn describe_all() {
    describe_counter!(DECISIONS_TOTAL, "Like and pass decisions made");
    describe_counter!(CATALOG_REQUESTS_TOTAL, "Catalog responses received, by kind and status");
    describe_counter!(
        CATALOG_REQUEST_FAILURES_TOTAL,
        "Catalog requests that failed before a response"
    );
    describe_histogram!(CATALOG_REQUEST_DURATION_SECONDS, "Catalog request latency");
    describe_counter!(PERSISTENCE_ERRORS_TOTAL, "Failed writes to the persistent store");
    describe_counter!(STALE_RESPONSES_TOTAL, "Responses discarded because a newer request was issued");
}

/// Installs the Prometheus exporter on `listen_addr`. Idempotent; must run
/// inside a tokio runtime.
pub fn init_metrics(listen_addr: &str) -> Result<SocketAddr> {
    if let Some(addr) = INSTALLED.get() {
        return Ok(*addr);
    }
    let addr: SocketAddr = listen_addr
        .parse()
        .map_err(|e| SwipeError::Config(format!("Invalid metrics address '{}': {}", listen_addr, e)))?;
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| SwipeError::Config(format!("Failed to install Prometheus exporter: {}", e)))?;
    describe_all();
    let _ = INSTALLED.set(addr);
    info!("Prometheus exporter listening at http://{}/metrics", addr);
    Ok(addr)
}
