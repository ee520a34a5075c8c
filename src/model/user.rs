//! User document

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::extend_unique;

/// Artifactory user, as returned by `security/users/{name}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Group memberships, without duplicates
    #[serde(default)]
    pub groups: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Add a group membership. Returns false if the user was already a member.
    pub fn join_group(&mut self, group: &str) -> bool {
        extend_unique(&mut self.groups, &[group.to_string()])
    }

    pub fn is_member_of(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}
