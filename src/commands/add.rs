//! `add`: create what is missing and merge grants into permission targets

use serde_json::{json, Map, Value};

use crate::cli::AddArgs;
use crate::client::{ResourceKind, Transport};
use crate::error::{Error, Result};
use crate::model::{GroupGrant, PackageType, PermissionGrant};
use crate::reconcilers::{validate_grant, validate_name, Reconciler};

/// Build the permission grant described by the flags, if any
fn permission_grant(args: &AddArgs) -> Result<Option<PermissionGrant>> {
    let Some(perm) = &args.perm else {
        if args.groupperm.is_some() {
            return Err(Error::config("--groupperm only applies together with --perm"));
        }
        return Ok(None);
    };

    let group = match (&args.group, &args.groupperm) {
        (Some(name), Some(permissions)) => Some(GroupGrant {
            name: name.clone(),
            permissions: permissions.clone(),
        }),
        (Some(name), None) => {
            return Err(Error::config(format!(
                "--groupperm is required to grant group '{}' on permission target '{}'",
                name, perm
            )))
        }
        (None, Some(_)) => return Err(Error::config("--groupperm requires --group")),
        (None, None) => None,
    };

    let grant = PermissionGrant {
        name: perm.clone(),
        repositories: args.repos.clone(),
        group,
        public_read: args.public,
    };
    validate_grant(&grant)?;
    Ok(Some(grant))
}

/// Run `add`.
///
/// With `--user`, adds the user to `--usergroup` and returns the user.
/// Otherwise ensures each repository, then the group, then reconciles the
/// permission target and returns it. All input is validated before the
/// first request; a failure part way through leaves earlier steps applied.
pub async fn run<T: Transport>(reconciler: &Reconciler<T>, args: &AddArgs) -> Result<Value> {
    if let Some(user) = &args.user {
        let group = args
            .usergroup
            .as_deref()
            .ok_or_else(|| Error::config("--usergroup is required with --user"))?;
        reconciler.add_user_to_group(user, group).await?;
        return reconciler.fetch(ResourceKind::User, user).await;
    }

    let grant = permission_grant(args)?;
    for repo in &args.repos {
        validate_name(ResourceKind::Repository, repo)?;
    }
    if let Some(group) = &args.group {
        validate_name(ResourceKind::Group, group)?;
    }
    if !args.repos.is_empty() {
        args.repopackage.parse::<PackageType>()?;
    }
    if args.repos.is_empty() && args.group.is_none() && grant.is_none() {
        return Err(Error::config(
            "Nothing to add: give --user with --usergroup, or --repo, --group or --perm",
        ));
    }

    let mut repositories = Map::new();
    for repo in &args.repos {
        let outcome = reconciler
            .ensure_repository(repo, args.repoclass, &args.repopackage)
            .await?;
        repositories.insert(repo.clone(), json!(outcome.as_str()));
    }

    let mut groups = Map::new();
    if let Some(group) = &args.group {
        let outcome = reconciler.ensure_group(group, args.grouprealm).await?;
        groups.insert(group.clone(), json!(outcome.as_str()));
    }

    match grant {
        Some(grant) => {
            reconciler.reconcile_permission_target(&grant).await?;
            reconciler
                .fetch(ResourceKind::PermissionTarget, &grant.name)
                .await
        }
        None => Ok(json!({ "repositories": repositories, "groups": groups })),
    }
}
