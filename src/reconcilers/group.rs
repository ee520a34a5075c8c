//! Group reconciler

use tracing::{info, instrument};

use crate::client::{ResourceKind, Transport};
use crate::error::Result;
use crate::metrics;
use crate::model::{Group, Realm};

use super::{record, validate_name, Outcome, Reconciler};

impl<T: Transport> Reconciler<T> {
    /// Ensure a group exists. Realm and flags of an existing group are never
    /// touched.
    #[instrument(skip(self))]
    pub async fn ensure_group(&self, name: &str, realm: Realm) -> Result<Outcome> {
        validate_name(ResourceKind::Group, name)?;

        let _timer = metrics::RECONCILE_DURATION
            .with_label_values(&[ResourceKind::Group.label()])
            .start_timer();
        let result = self.apply_group(name, realm).await;
        record(ResourceKind::Group, &result);
        result
    }

    async fn apply_group(&self, name: &str, realm: Realm) -> Result<Outcome> {
        if self.lookup(ResourceKind::Group, name).await?.is_some() {
            info!(name = %name, "Group already exists");
            return Ok(Outcome::Unchanged);
        }

        info!(name = %name, realm = %realm, "Creating group");
        self.write(ResourceKind::Group, name, &Group::new(name, realm))
            .await?;
        Ok(Outcome::Created)
    }

    pub async fn group(&self, name: &str) -> Result<Group> {
        self.fetch_as(ResourceKind::Group, name).await
    }

    pub async fn delete_group(&self, name: &str) -> Result<()> {
        self.delete(ResourceKind::Group, name).await
    }
}
