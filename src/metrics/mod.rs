//! Prometheus metrics for the Artifactory reconciler
//!
//! A CLI run is short-lived, so instead of serving `/metrics` the registry can
//! be written to a node-exporter textfile when the command finishes.

mod registry;

pub use registry::*;
