//! reqwest-backed transport with HTTP Basic authentication

use async_trait::async_trait;
use tracing::debug;

use crate::config::{ArtifactoryConfig, Credentials};
use crate::error::Result;
use crate::metrics;

use super::{ApiRequest, ApiResponse, Transport};

/// HTTP transport for a single Artifactory instance
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpTransport {
    /// Build the client from configuration.
    ///
    /// Certificate verification follows `config.verify_tls`.
    pub fn new(config: &ArtifactoryConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            credentials: config.credentials.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let method_label = request.method.as_str();
        let _timer = metrics::UPSTREAM_REQUEST_DURATION
            .with_label_values(&[method_label])
            .start_timer();

        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path))
            .basic_auth(&self.credentials.username, Some(&self.credentials.password));
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::UPSTREAM_REQUESTS
                    .with_label_values(&[method_label, "error"])
                    .inc();
                return Err(e.into());
            }
        };

        let status = response.status().as_u16();
        let body = response.text().await?;

        let status_label = status.to_string();
        metrics::UPSTREAM_REQUESTS
            .with_label_values(&[method_label, status_label.as_str()])
            .inc();
        debug!(method = %request.method, path = %request.path, status, "Artifactory request completed");

        Ok(ApiResponse { status, body })
    }
}
