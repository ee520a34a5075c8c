//! Resource kinds, their endpoints, and status classification
//!
//! Artifactory is inconsistent about how it reports a missing resource:
//! repositories answer 400 where users, groups and permission targets answer
//! 404. That quirk is contained here.

use std::fmt;

use reqwest::Method;

/// The Artifactory resource kinds this tool manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    User,
    Group,
    Repository,
    PermissionTarget,
}

/// How a response status relates to the existence of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
    Error,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::User,
        ResourceKind::Group,
        ResourceKind::Repository,
        ResourceKind::PermissionTarget,
    ];

    /// Path prefix under the API base URL
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::User => "security/users",
            ResourceKind::Group => "security/groups",
            ResourceKind::Repository => "repositories",
            ResourceKind::PermissionTarget => "security/permissions",
        }
    }

    pub fn path(&self, name: &str) -> String {
        format!("{}/{}", self.collection(), name)
    }

    /// Method used for create and full replace
    pub fn write_method(&self) -> Method {
        match self {
            ResourceKind::User => Method::POST,
            _ => Method::PUT,
        }
    }

    /// Statuses meaning "does not exist" for this kind
    pub fn absent_statuses(&self) -> &'static [u16] {
        match self {
            ResourceKind::Repository => &[400, 404],
            _ => &[404],
        }
    }

    /// Split a request path back into its kind and resource name
    pub fn parse_path(path: &str) -> Option<(ResourceKind, &str)> {
        Self::ALL.into_iter().find_map(|kind| {
            path.strip_prefix(kind.collection())
                .and_then(|rest| rest.strip_prefix('/'))
                .filter(|name| !name.is_empty() && !name.contains('/'))
                .map(|name| (kind, name))
        })
    }

    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Group => "group",
            ResourceKind::Repository => "repository",
            ResourceKind::PermissionTarget => "permission_target",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::User => "User",
            ResourceKind::Group => "Group",
            ResourceKind::Repository => "Repository",
            ResourceKind::PermissionTarget => "Permission target",
        };
        f.write_str(name)
    }
}

/// Classify a response status for a resource kind
pub fn classify_status(kind: ResourceKind, status: u16) -> Presence {
    match status {
        200..=299 => Presence::Present,
        s if kind.absent_statuses().contains(&s) => Presence::Absent,
        _ => Presence::Error,
    }
}
