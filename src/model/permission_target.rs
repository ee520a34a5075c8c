//! Permission target document and merge rules

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{dedup_in_order, extend_unique, PermissionLetter, PermissionSet};

/// Name of the built-in anonymous user principal
pub const ANONYMOUS_USER: &str = "anonymous";

/// Artifactory permission target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionTarget {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Repositories the grants apply to, without duplicates
    #[serde(default)]
    pub repositories: Vec<String>,

    #[serde(default)]
    pub principals: Principals,

    /// Fields not modelled here (includePattern, excludePattern, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User and group grants of a permission target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Principals {
    #[serde(default)]
    pub users: BTreeMap<String, PermissionSet>,

    #[serde(default)]
    pub groups: BTreeMap<String, PermissionSet>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Desired state for one permission target reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionGrant {
    /// Permission target name
    pub name: String,
    /// Repositories to include
    pub repositories: Vec<String>,
    /// Group to insert or overwrite; `None` leaves the group map alone
    pub group: Option<GroupGrant>,
    /// Whether anonymous users get read access
    pub public_read: bool,
}

/// Permissions for a single named group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupGrant {
    pub name: String,
    pub permissions: PermissionSet,
}

impl PermissionGrant {
    /// The anonymous permission set implied by `public_read`
    pub fn anonymous_permissions(&self) -> PermissionSet {
        if self.public_read {
            PermissionSet::read_only()
        } else {
            PermissionSet::empty()
        }
    }
}

impl PermissionTarget {
    /// Build a brand new target from a grant
    pub fn from_grant(grant: &PermissionGrant) -> Self {
        let mut users = BTreeMap::new();
        users.insert(ANONYMOUS_USER.to_string(), grant.anonymous_permissions());

        let mut groups = BTreeMap::new();
        if let Some(group) = &grant.group {
            groups.insert(group.name.clone(), group.permissions.clone());
        }

        Self {
            name: grant.name.clone(),
            repositories: dedup_in_order(&grant.repositories),
            principals: Principals {
                users,
                groups,
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    /// Merge a grant into an existing target.
    ///
    /// Repositories are unioned, the anonymous user's permissions are
    /// replaced wholesale (so `public_read = false` revokes an earlier read
    /// grant), and the named group is upserted. Other users and groups are
    /// left untouched.
    pub fn merge(&mut self, grant: &PermissionGrant) {
        let mut repositories = dedup_in_order(&self.repositories);
        extend_unique(&mut repositories, &grant.repositories);
        self.repositories = repositories;

        self.principals
            .users
            .insert(ANONYMOUS_USER.to_string(), grant.anonymous_permissions());

        if let Some(group) = &grant.group {
            self.principals
                .groups
                .insert(group.name.clone(), group.permissions.clone());
        }
    }

    pub fn anonymous_can_read(&self) -> bool {
        self.principals
            .users
            .get(ANONYMOUS_USER)
            .is_some_and(|perms| perms.contains(PermissionLetter::Read))
    }
}
