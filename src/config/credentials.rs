//! Credential resolution from flags or a credential file

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

use super::Credentials;

/// Server and login resolved for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub server: String,
    pub credentials: Credentials,
}

/// Parse credential file contents: server, username and password on the
/// first three lines.
pub fn parse_credentials(contents: &str, source: &str) -> Result<ConnectionInfo> {
    let mut lines = contents.lines();

    let mut next_line = |field: &str| {
        lines
            .next()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::config(format!("Credential file {} is missing the {} line", source, field))
            })
    };

    let server = next_line("server name")?;
    let username = next_line("username")?;
    let password = next_line("password")?;

    Ok(ConnectionInfo {
        server: server.trim().to_string(),
        credentials: Credentials::new(username.trim(), password),
    })
}

/// Read a credential file from disk
pub fn load_credential_file(path: &Path) -> Result<ConnectionInfo> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read credential file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_credentials(&contents, &path.display().to_string())
}

/// Explicit server/username/password win when all three are given;
/// otherwise the credential file is used.
pub fn resolve_connection(
    server: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
    credential_file: &Path,
) -> Result<ConnectionInfo> {
    match (server, username, password) {
        (Some(server), Some(username), Some(password)) => Ok(ConnectionInfo {
            server: server.to_string(),
            credentials: Credentials::new(username, password),
        }),
        _ => load_credential_file(credential_file),
    }
}
