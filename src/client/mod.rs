//! REST transport for the Artifactory API
//!
//! The reconciler talks to Artifactory through the [`Transport`] trait so the
//! merge logic can run against the real HTTP client or the in-memory fake in
//! [`crate::testing`].

mod classify;
mod http;

pub use classify::*;
pub use http::*;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::{Error, Result};

/// One REST call, with a path relative to the API base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path, None)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path, None)
    }

    pub fn is_write(&self) -> bool {
        self.method == Method::PUT || self.method == Method::POST
    }
}

/// Raw upstream response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON; an empty body is `null`
    pub fn json(&self) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turn a failed response into an upstream error carrying status and body
    pub fn into_upstream_error(self, request: &ApiRequest) -> Error {
        Error::Upstream {
            method: request.method.to_string(),
            path: request.path.clone(),
            status: self.status,
            body: self.body,
        }
    }
}

/// Sends a single request and returns the raw response.
///
/// Implementations only fail for transport problems; any HTTP status,
/// including 4xx/5xx, is returned as a response for the caller to classify.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}
