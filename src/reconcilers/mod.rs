//! Reconcilers for Artifactory resources
//!
//! This module contains the business logic for reconciling each resource
//! kind. Reconcilers are responsible for:
//! - Validating input before any request is sent
//! - Creating absent resources
//! - Merging desired state into existing documents without clobbering them
//!
//! Read-modify-write updates are not transactional. Under
//! [`WritePolicy::LastWriteWins`] a change another client makes between our
//! read and our write is silently overwritten.

mod group;
mod permission_target;
mod repository;
mod user;

pub use permission_target::validate_grant;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::client::{classify_status, ApiRequest, HttpTransport, Presence, ResourceKind, Transport};
use crate::config::{ArtifactoryConfig, WritePolicy};
use crate::error::{Error, Result};
use crate::metrics;

/// What a reconciliation did to the remote resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Unchanged,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Updated => "updated",
            Outcome::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconciles Artifactory resources through a [`Transport`]
pub struct Reconciler<T> {
    transport: T,
    write_policy: WritePolicy,
}

impl Reconciler<HttpTransport> {
    /// Reconciler talking HTTP to the configured instance
    pub fn from_config(config: &ArtifactoryConfig) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(config)?, config.write_policy))
    }
}

impl<T: Transport> Reconciler<T> {
    pub fn new(transport: T, write_policy: WritePolicy) -> Self {
        Self {
            transport,
            write_policy,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the raw document of a resource
    pub async fn fetch(&self, kind: ResourceKind, name: &str) -> Result<Value> {
        validate_name(kind, name)?;
        self.lookup(kind, name)
            .await?
            .ok_or_else(|| Error::not_found(kind, name))
    }

    /// Fetch and parse a resource into its document model
    pub async fn fetch_as<D: DeserializeOwned>(&self, kind: ResourceKind, name: &str) -> Result<D> {
        let value = self.fetch(kind, name).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Delete a resource. An absent resource is reported as `NotFound`.
    pub async fn delete(&self, kind: ResourceKind, name: &str) -> Result<()> {
        validate_name(kind, name)?;
        let request = ApiRequest::delete(kind.path(name));
        let response = self.transport.send(&request).await?;
        match classify_status(kind, response.status) {
            Presence::Present => {
                info!(kind = %kind, name = %name, "Deleted");
                Ok(())
            }
            Presence::Absent => Err(Error::not_found(kind, name)),
            Presence::Error => Err(response.into_upstream_error(&request)),
        }
    }

    /// GET a resource: `None` when the upstream reports it absent
    pub(crate) async fn lookup(&self, kind: ResourceKind, name: &str) -> Result<Option<Value>> {
        let request = ApiRequest::get(kind.path(name));
        let response = self.transport.send(&request).await?;
        match classify_status(kind, response.status) {
            Presence::Present => Ok(Some(response.json()?)),
            Presence::Absent => Ok(None),
            Presence::Error => Err(response.into_upstream_error(&request)),
        }
    }

    /// GET and parse, keeping the raw document as the merge base
    pub(crate) async fn lookup_as<D: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Option<(D, Value)>> {
        match self.lookup(kind, name).await? {
            Some(raw) => {
                let doc = serde_json::from_value(raw.clone())?;
                Ok(Some((doc, raw)))
            }
            None => Ok(None),
        }
    }

    /// Create or fully replace a resource
    pub(crate) async fn write<S: Serialize>(
        &self,
        kind: ResourceKind,
        name: &str,
        doc: &S,
    ) -> Result<()> {
        let request = ApiRequest::new(
            kind.write_method(),
            kind.path(name),
            Some(serde_json::to_value(doc)?),
        );
        let response = self.transport.send(&request).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(response.into_upstream_error(&request))
        }
    }

    /// Write the result of a merge whose base document was `base`.
    ///
    /// Under `RejectIfChanged` the resource is read again first and the write
    /// is refused if it no longer equals `base`.
    pub(crate) async fn write_merged<S: Serialize>(
        &self,
        kind: ResourceKind,
        name: &str,
        base: &Value,
        doc: &S,
    ) -> Result<()> {
        if self.write_policy == WritePolicy::RejectIfChanged {
            let current = self.lookup(kind, name).await?;
            if current.as_ref() != Some(base) {
                warn!(kind = %kind, name = %name, "Resource changed since it was read, not writing");
                return Err(Error::Conflict {
                    kind,
                    name: name.to_string(),
                });
            }
        }
        self.write(kind, name, doc).await
    }
}

/// Reject names that cannot be used as a single path segment
pub fn validate_name(kind: ResourceKind, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::config(format!("{} name must not be empty", kind)));
    }
    if name.contains(['/', '?', '#']) {
        return Err(Error::config(format!(
            "Invalid {} name '{}': must not contain '/', '?' or '#'",
            kind.label(),
            name
        )));
    }
    Ok(())
}

/// Count a finished reconciliation
fn record(kind: ResourceKind, result: &Result<Outcome>) {
    match result {
        Ok(outcome) => metrics::RECONCILIATIONS
            .with_label_values(&[kind.label(), outcome.as_str()])
            .inc(),
        Err(_) => metrics::RECONCILIATION_ERRORS
            .with_label_values(&[kind.label()])
            .inc(),
    }
}
