//! Repository reconciler
//!
//! Repositories are created when absent and never updated: an existing
//! repository is left exactly as it is, whatever its class or type.

use tracing::{info, instrument};

use crate::client::{ResourceKind, Transport};
use crate::error::Result;
use crate::metrics;
use crate::model::{PackageType, RepoClass, Repository};

use super::{record, validate_name, Outcome, Reconciler};

impl<T: Transport> Reconciler<T> {
    /// Ensure a repository exists.
    ///
    /// Fails with a configuration error before any request when the package
    /// type has no known layout.
    #[instrument(skip(self))]
    pub async fn ensure_repository(
        &self,
        name: &str,
        rclass: RepoClass,
        package_type: &str,
    ) -> Result<Outcome> {
        let package_type: PackageType = package_type.parse()?;
        validate_name(ResourceKind::Repository, name)?;

        let _timer = metrics::RECONCILE_DURATION
            .with_label_values(&[ResourceKind::Repository.label()])
            .start_timer();
        let result = self.apply_repository(name, rclass, package_type).await;
        record(ResourceKind::Repository, &result);
        result
    }

    async fn apply_repository(
        &self,
        name: &str,
        rclass: RepoClass,
        package_type: PackageType,
    ) -> Result<Outcome> {
        if self.lookup(ResourceKind::Repository, name).await?.is_some() {
            info!(name = %name, "Repository already exists");
            return Ok(Outcome::Unchanged);
        }

        info!(name = %name, rclass = %rclass, package_type = %package_type, "Creating repository");
        let repository = Repository::new(name, rclass, package_type);
        self.write(ResourceKind::Repository, name, &repository).await?;
        Ok(Outcome::Created)
    }

    pub async fn repository(&self, name: &str) -> Result<Repository> {
        self.fetch_as(ResourceKind::Repository, name).await
    }

    pub async fn delete_repository(&self, name: &str) -> Result<()> {
        self.delete(ResourceKind::Repository, name).await
    }
}
