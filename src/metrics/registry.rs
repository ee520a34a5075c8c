//! Prometheus metrics definitions and textfile export

use std::fs;
use std::path::Path;

use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{Error, Result};

lazy_static::lazy_static! {
    /// Total number of reconciliations by outcome
    pub static ref RECONCILIATIONS: CounterVec = register_counter_vec!(
        "artifactory_reconciler_reconciliations_total",
        "Total number of reconciliations",
        &["kind", "outcome"]
    ).unwrap();

    /// Total number of failed reconciliations
    pub static ref RECONCILIATION_ERRORS: CounterVec = register_counter_vec!(
        "artifactory_reconciler_reconciliation_errors_total",
        "Total number of reconciliation errors",
        &["kind"]
    ).unwrap();

    /// Reconciliation duration histogram
    pub static ref RECONCILE_DURATION: HistogramVec = register_histogram_vec!(
        "artifactory_reconciler_reconcile_duration_seconds",
        "Duration of reconciliations in seconds",
        &["kind"],
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    /// Requests sent to Artifactory, by method and status code
    pub static ref UPSTREAM_REQUESTS: CounterVec = register_counter_vec!(
        "artifactory_reconciler_upstream_requests_total",
        "Total number of requests sent to Artifactory",
        &["method", "status"]
    ).unwrap();

    /// Upstream request latency
    pub static ref UPSTREAM_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "artifactory_reconciler_upstream_request_duration_seconds",
        "Duration of Artifactory requests in seconds",
        &["method"],
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();
}

/// Encode every registered metric in the text exposition format
pub fn render() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| Error::Metrics(e.to_string()))?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write metrics to `path` for the node-exporter textfile collector.
///
/// The file is written next to the target and renamed into place so the
/// collector never reads a partial file.
pub fn write_textfile(path: &Path) -> Result<()> {
    let rendered = render()?;
    let tmp = path.with_extension("prom.tmp");
    fs::write(&tmp, rendered)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
