//! Connection configuration
//!
//! Built once at startup and passed explicitly into the transport and the
//! reconciler.

mod credentials;

pub use credentials::*;

use std::fmt;

/// Default location of the credential file
pub const DEFAULT_CREDENTIAL_FILE: &str = "/tmp/.artifactory_info";

/// HTTP Basic credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How read-modify-write updates treat concurrent writers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePolicy {
    /// Write the merged document unconditionally; a change made by another
    /// writer between our read and our write is lost.
    #[default]
    LastWriteWins,
    /// Re-read just before writing and fail with a conflict if the document
    /// no longer matches the one the merge was based on.
    RejectIfChanged,
}

/// Everything needed to reach one Artifactory instance
#[derive(Debug, Clone)]
pub struct ArtifactoryConfig {
    /// API base URL, always ending in `/artifactory/api/`
    pub base_url: String,
    pub credentials: Credentials,
    /// Verify server TLS certificates (off by default)
    pub verify_tls: bool,
    pub write_policy: WritePolicy,
}

impl ArtifactoryConfig {
    pub fn new(server: &str, credentials: Credentials) -> Self {
        Self {
            base_url: api_base_url(server),
            credentials,
            verify_tls: false,
            write_policy: WritePolicy::default(),
        }
    }

    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    pub fn with_write_policy(mut self, write_policy: WritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }
}

/// Build the API base URL from a server name.
///
/// A bare host name gets `https://`; a value that already carries a scheme is
/// used as is.
pub fn api_base_url(server: &str) -> String {
    let server = server.trim().trim_end_matches('/');
    if server.starts_with("http://") || server.starts_with("https://") {
        format!("{}/artifactory/api/", server)
    } else {
        format!("https://{}/artifactory/api/", server)
    }
}
