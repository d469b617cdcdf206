//! Metrics collection for the catalog server
//!
//! Prometheus metrics registered in the default registry and exposed on `/metrics`.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};

lazy_static! {
    // HTTP Request Metrics

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "catalog_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "catalog_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    /// In-flight HTTP requests
    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGaugeVec = register_int_gauge_vec!(
        "catalog_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
        &["method", "path"]
    )
    .expect("Failed to register HTTP_REQUESTS_IN_FLIGHT");

    // Catalog Metrics

    /// Catalog queries by entity kind and outcome
    pub static ref CATALOG_QUERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "catalog_queries_total",
        "Total number of catalog list queries",
        &["entity", "status"]
    )
    .expect("Failed to register CATALOG_QUERIES_TOTAL");

    /// Total matches reported by list queries
    pub static ref CATALOG_QUERY_MATCHES: HistogramVec = register_histogram_vec!(
        "catalog_query_matches",
        "Number of rows matching a catalog list query",
        &["entity"],
        vec![0.0, 1.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0, 10000.0, 50000.0]
    )
    .expect("Failed to register CATALOG_QUERY_MATCHES");

    /// Store round-trip duration
    pub static ref STORE_QUERY_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "catalog_store_query_duration_seconds",
        "Catalog store query duration in seconds",
        &["query_type"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    )
    .expect("Failed to register STORE_QUERY_DURATION_SECONDS");

    // Ingest Metrics

    /// Rows written by seed and refresh runs
    pub static ref INGEST_ROWS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "catalog_ingest_rows_total",
        "Rows processed by seed and refresh runs",
        &["entity", "outcome"]
    )
    .expect("Failed to register INGEST_ROWS_TOTAL");

    /// Refresh runs by outcome
    pub static ref REFRESH_RUNS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "catalog_refresh_runs_total",
        "Upstream refresh runs",
        &["source", "status"]
    )
    .expect("Failed to register REFRESH_RUNS_TOTAL");
}

/// Collapse path segments that carry identifiers so label cardinality stays bounded.
pub fn sanitize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    let segments: Vec<&str> = trimmed.split('/').collect();
    match segments.as_slice() {
        ["", "api", "products", _id] => "/api/products/:id".to_string(),
        ["", "api", "tuss", _code] => "/api/tuss/:code".to_string(),
        ["", "api", "filters", _facet] => "/api/filters/:facet".to_string(),
        ["", "api", "products" | "tuss" | "stats" | "health"] | ["", "metrics"] => trimmed.to_string(),
        _ => "/other".to_string(),
    }
}
