//! Group document

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Authentication source backing a group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Realm {
    #[default]
    Internal,
    Ldap,
    Crowd,
}

impl Realm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Realm::Internal => "internal",
            Realm::Ldap => "ldap",
            Realm::Crowd => "crowd",
        }
    }
}

impl FromStr for Realm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "internal" => Ok(Realm::Internal),
            "ldap" => Ok(Realm::Ldap),
            "crowd" => Ok(Realm::Crowd),
            other => Err(Error::config(format!(
                "Invalid group realm '{}': must be one of: internal, ldap, crowd",
                other
            ))),
        }
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifactory group
///
/// Realm and flags are fixed at creation; this tool never updates an
/// existing group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default)]
    pub auto_join: bool,

    #[serde(default)]
    pub realm: Realm,

    #[serde(default)]
    pub admin_privileges: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Group {
    /// Creation body: no auto-join, no admin privileges
    pub fn new(name: impl Into<String>, realm: Realm) -> Self {
        Self {
            name: name.into(),
            auto_join: false,
            realm,
            admin_privileges: false,
            extra: Map::new(),
        }
    }
}
