//! Error types for the Artifactory reconciler

use thiserror::Error;

use crate::client::ResourceKind;

/// Result type alias using the reconciler's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler error types
#[derive(Error, Debug)]
pub enum Error {
    /// Upstream reports the resource does not exist
    #[error("{kind} '{name}' not found")]
    NotFound { kind: ResourceKind, name: String },

    /// Invalid input detected before any request was sent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other non-2xx upstream response
    #[error("Upstream error: {method} {path} returned HTTP {status}: {body}")]
    Upstream {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    /// The resource changed between the merge read and the write
    #[error("{kind} '{name}' was modified concurrently, refusing to overwrite")]
    Conflict { kind: ResourceKind, name: String },

    /// Transport-level HTTP failure (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A smoke-test check did not hold
    #[error("Verification failed: {0}")]
    Verification(String),

    /// YAML output error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Metrics encoding error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a verification error
    pub fn verification(msg: impl Into<String>) -> Self {
        Error::Verification(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Whether this error means the resource is absent upstream
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
