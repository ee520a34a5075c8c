//! Command-line interface definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::client::ResourceKind;
use crate::config::{
    resolve_connection, ArtifactoryConfig, WritePolicy, DEFAULT_CREDENTIAL_FILE,
};
use crate::error::Result;
use crate::model::{PermissionSet, Realm, RepoClass};

#[derive(Parser, Debug)]
#[command(name = "artifactory-cli")]
#[command(about = "Manage Artifactory users, groups, repositories and permission targets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Credential file with the server name, username and password on separate lines
    #[arg(long = "cred", global = true, default_value = DEFAULT_CREDENTIAL_FILE)]
    pub credential_file: PathBuf,

    /// Artifactory server name
    #[arg(short = 's', long, global = true, env = "ARTIFACTORY_SERVER")]
    pub server: Option<String>,

    /// Artifactory login username
    #[arg(short = 'u', long, global = true, env = "ARTIFACTORY_USERNAME")]
    pub username: Option<String>,

    /// Artifactory login password
    #[arg(
        short = 'p',
        long,
        global = true,
        env = "ARTIFACTORY_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Verify the server's TLS certificate
    #[arg(long, global = true)]
    pub verify_tls: bool,

    /// Refuse to overwrite a resource that changed while it was being merged
    #[arg(long, global = true)]
    pub reject_if_changed: bool,

    /// Output format for printed documents
    #[arg(short = 'o', long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Write Prometheus metrics to this textfile when done
    #[arg(long, global = true)]
    pub metrics_file: Option<PathBuf>,

    /// Log as JSON lines instead of plain text
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a user, group, repository or permission target
    Get(SelectArgs),
    /// Create repositories, groups and permission targets, or add a user to a group
    Add(AddArgs),
    /// Delete a user, group, repository or permission target
    Delete(SelectArgs),
    /// Create, verify and remove a throwaway repository, groups and permission target
    SmokeTest(SmokeTestArgs),
}

/// Exactly one resource to act on
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SelectArgs {
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub group: Option<String>,
    #[arg(long)]
    pub repo: Option<String>,
    #[arg(long)]
    pub perm: Option<String>,
}

impl SelectArgs {
    pub fn target(&self) -> Option<(ResourceKind, &str)> {
        [
            (ResourceKind::User, &self.user),
            (ResourceKind::Group, &self.group),
            (ResourceKind::Repository, &self.repo),
            (ResourceKind::PermissionTarget, &self.perm),
        ]
        .into_iter()
        .find_map(|(kind, name)| name.as_deref().map(|name| (kind, name)))
    }
}

#[derive(clap::Args, Debug, Default)]
pub struct AddArgs {
    /// User to add to --usergroup
    #[arg(long)]
    pub user: Option<String>,

    /// Group the user joins
    #[arg(long, requires = "user")]
    pub usergroup: Option<String>,

    /// Repository to create if absent and include in --perm (repeatable)
    #[arg(long = "repo")]
    pub repos: Vec<String>,

    /// local | remote | virtual
    #[arg(long, default_value = "local")]
    pub repoclass: RepoClass,

    /// generic | bower | docker | gradle | maven | npm | nuget | pypi | rpm | ruby | vagrant
    #[arg(long, default_value = "generic")]
    pub repopackage: String,

    /// Group to create if absent and grant --groupperm in --perm
    #[arg(long)]
    pub group: Option<String>,

    /// internal | ldap | crowd
    #[arg(long, default_value = "internal")]
    pub grouprealm: Realm,

    /// Permission target to create or merge into
    #[arg(long)]
    pub perm: Option<String>,

    /// m=manage, d=delete, w=deploy, n=annotate, r=read
    #[arg(long)]
    pub groupperm: Option<PermissionSet>,

    /// Give anonymous users read access (omitting it revokes existing public read)
    #[arg(long)]
    pub public: bool,
}

#[derive(clap::Args, Debug)]
pub struct SmokeTestArgs {
    /// Prefix for the names of the resources the test creates
    #[arg(long, default_value = "reconciler-smoke")]
    pub prefix: String,
}

impl Cli {
    /// Resolve connection settings from flags or the credential file
    pub fn artifactory_config(&self) -> Result<ArtifactoryConfig> {
        let connection = resolve_connection(
            self.server.as_deref(),
            self.username.as_deref(),
            self.password.as_deref(),
            &self.credential_file,
        )?;

        let write_policy = if self.reject_if_changed {
            WritePolicy::RejectIfChanged
        } else {
            WritePolicy::LastWriteWins
        };

        Ok(ArtifactoryConfig::new(&connection.server, connection.credentials)
            .with_verify_tls(self.verify_tls)
            .with_write_policy(write_policy))
    }
}
