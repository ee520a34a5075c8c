//! Repository document and the package-type layout table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Repository class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoClass {
    #[default]
    Local,
    Remote,
    Virtual,
}

impl RepoClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoClass::Local => "local",
            RepoClass::Remote => "remote",
            RepoClass::Virtual => "virtual",
        }
    }
}

impl FromStr for RepoClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local" => Ok(RepoClass::Local),
            "remote" => Ok(RepoClass::Remote),
            "virtual" => Ok(RepoClass::Virtual),
            other => Err(Error::config(format!(
                "Invalid repository class '{}': must be one of: local, remote, virtual",
                other
            ))),
        }
    }
}

impl fmt::Display for RepoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Package types this tool knows a repository layout for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Generic,
    Bower,
    Docker,
    Gradle,
    Maven,
    Npm,
    Nuget,
    Pypi,
    Rpm,
    Ruby,
    Vagrant,
}

impl PackageType {
    pub const ALL: [PackageType; 11] = [
        PackageType::Generic,
        PackageType::Bower,
        PackageType::Docker,
        PackageType::Gradle,
        PackageType::Maven,
        PackageType::Npm,
        PackageType::Nuget,
        PackageType::Pypi,
        PackageType::Rpm,
        PackageType::Ruby,
        PackageType::Vagrant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::Generic => "generic",
            PackageType::Bower => "bower",
            PackageType::Docker => "docker",
            PackageType::Gradle => "gradle",
            PackageType::Maven => "maven",
            PackageType::Npm => "npm",
            PackageType::Nuget => "nuget",
            PackageType::Pypi => "pypi",
            PackageType::Rpm => "rpm",
            PackageType::Ruby => "ruby",
            PackageType::Vagrant => "vagrant",
        }
    }

    /// Repository layout reference for this package type
    pub fn layout_ref(&self) -> &'static str {
        match self {
            PackageType::Bower => "bower-default",
            PackageType::Gradle => "gradle-default",
            PackageType::Maven => "maven-2-default",
            PackageType::Npm => "npm-default",
            PackageType::Nuget => "nuget-default",
            PackageType::Generic
            | PackageType::Docker
            | PackageType::Pypi
            | PackageType::Rpm
            | PackageType::Ruby
            | PackageType::Vagrant => "simple-default",
        }
    }
}

impl FromStr for PackageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|t| t.as_str()).collect();
                Error::config(format!(
                    "Unknown package type '{}': must be one of: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifactory repository configuration
///
/// Class and package type are kept as the server reports them, which may be
/// outside what this tool can create (`federated`, `helm`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,

    pub rclass: String,

    pub package_type: String,

    #[serde(default)]
    pub repo_layout_ref: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Repository {
    pub fn new(key: impl Into<String>, rclass: RepoClass, package_type: PackageType) -> Self {
        Self {
            key: key.into(),
            rclass: rclass.as_str().to_string(),
            package_type: package_type.as_str().to_string(),
            repo_layout_ref: package_type.layout_ref().to_string(),
            extra: Map::new(),
        }
    }
}
