//! Permission target reconciler
//!
//! Artifactory has no partial update for permission targets, so adding a
//! repository or group means fetching the target, merging, and writing the
//! whole document back.

use tracing::{info, instrument, warn};

use crate::client::{ResourceKind, Transport};
use crate::error::{Error, Result};
use crate::metrics;
use crate::model::{PermissionGrant, PermissionTarget};

use super::{record, validate_name, Outcome, Reconciler};

/// Validate a grant before any request is sent
pub fn validate_grant(grant: &PermissionGrant) -> Result<()> {
    validate_name(ResourceKind::PermissionTarget, &grant.name)?;
    for repository in &grant.repositories {
        validate_name(ResourceKind::Repository, repository)?;
    }
    if let Some(group) = &grant.group {
        validate_name(ResourceKind::Group, &group.name)?;
    }
    Ok(())
}

impl<T: Transport> Reconciler<T> {
    /// Create the permission target, or merge the grant into the existing one.
    ///
    /// On merge, repositories are unioned, the anonymous user's permissions
    /// are replaced (so `public_read = false` revokes earlier public read),
    /// and the named group is inserted or overwritten.
    ///
    /// A failed lookup other than "absent" is returned as is; nothing is
    /// created in that case.
    ///
    /// A grant with no repositories is only invalid when the target does not
    /// exist yet, so that configuration error is raised after the lookup and
    /// before any write.
    #[instrument(skip(self, grant), fields(name = %grant.name))]
    pub async fn reconcile_permission_target(&self, grant: &PermissionGrant) -> Result<Outcome> {
        validate_grant(grant)?;

        let _timer = metrics::RECONCILE_DURATION
            .with_label_values(&[ResourceKind::PermissionTarget.label()])
            .start_timer();
        let result = self.apply_permission_target(grant).await;
        record(ResourceKind::PermissionTarget, &result);
        result
    }

    async fn apply_permission_target(&self, grant: &PermissionGrant) -> Result<Outcome> {
        let kind = ResourceKind::PermissionTarget;

        let Some((mut target, base)) = self.lookup_as::<PermissionTarget>(kind, &grant.name).await?
        else {
            if grant.repositories.is_empty() {
                return Err(Error::config(format!(
                    "At least one repository is required to create permission target '{}'",
                    grant.name
                )));
            }
            info!(name = %grant.name, "Creating permission target");
            self.write(kind, &grant.name, &PermissionTarget::from_grant(grant))
                .await?;
            return Ok(Outcome::Created);
        };

        if target.name.is_empty() {
            target.name = grant.name.clone();
        }
        let before = target.clone();
        if target.anonymous_can_read() && !grant.public_read {
            warn!(name = %grant.name, "Revoking anonymous read access on existing permission target");
        }
        target.merge(grant);

        if target == before {
            info!(name = %grant.name, "Permission target already up to date");
            return Ok(Outcome::Unchanged);
        }

        info!(name = %grant.name, "Updating permission target");
        self.write_merged(kind, &grant.name, &base, &target).await?;
        Ok(Outcome::Updated)
    }

    pub async fn permission_target(&self, name: &str) -> Result<PermissionTarget> {
        self.fetch_as(ResourceKind::PermissionTarget, name).await
    }

    pub async fn delete_permission_target(&self, name: &str) -> Result<()> {
        self.delete(ResourceKind::PermissionTarget, name).await
    }
}
