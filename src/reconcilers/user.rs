//! User membership reconciler

use tracing::{info, instrument};

use crate::client::{ResourceKind, Transport};
use crate::error::{Error, Result};
use crate::metrics;
use crate::model::User;

use super::{record, validate_name, Outcome, Reconciler};

impl<T: Transport> Reconciler<T> {
    /// Add a user to a group, keeping every existing membership.
    ///
    /// Both the user and the group must already exist. Membership is a set:
    /// adding a group the user already belongs to writes nothing.
    #[instrument(skip(self))]
    pub async fn add_user_to_group(&self, user_name: &str, group_name: &str) -> Result<Outcome> {
        validate_name(ResourceKind::User, user_name)?;
        validate_name(ResourceKind::Group, group_name)?;

        let _timer = metrics::RECONCILE_DURATION
            .with_label_values(&[ResourceKind::User.label()])
            .start_timer();
        let result = self.apply_membership(user_name, group_name).await;
        record(ResourceKind::User, &result);
        result
    }

    async fn apply_membership(&self, user_name: &str, group_name: &str) -> Result<Outcome> {
        let (mut user, base) = self
            .lookup_as::<User>(ResourceKind::User, user_name)
            .await?
            .ok_or_else(|| Error::not_found(ResourceKind::User, user_name))?;

        if self.lookup(ResourceKind::Group, group_name).await?.is_none() {
            return Err(Error::not_found(ResourceKind::Group, group_name));
        }

        if !user.join_group(group_name) {
            info!(user = %user_name, group = %group_name, "User is already a member");
            return Ok(Outcome::Unchanged);
        }

        info!(user = %user_name, group = %group_name, "Adding group to user");
        self.write_merged(ResourceKind::User, user_name, &base, &user)
            .await?;
        Ok(Outcome::Updated)
    }

    pub async fn user(&self, name: &str) -> Result<User> {
        self.fetch_as(ResourceKind::User, name).await
    }

    pub async fn delete_user(&self, name: &str) -> Result<()> {
        self.delete(ResourceKind::User, name).await
    }
}
