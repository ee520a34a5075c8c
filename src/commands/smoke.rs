//! `smoke-test`: a fixed create / verify / delete sequence
//!
//! Creates a repository, two groups and a permission target, checks the
//! merge behaviour on the live server, and removes everything again.

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::client::{ResourceKind, Transport};
use crate::error::{Error, Result};
use crate::model::{GroupGrant, PermissionGrant, Realm, RepoClass};
use crate::reconcilers::Reconciler;

struct Names {
    repository: String,
    first_group: String,
    second_group: String,
    permission: String,
}

fn check(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::verification(message()))
    }
}

fn group_grant(name: &str, letters: &str) -> Result<GroupGrant> {
    Ok(GroupGrant {
        name: name.to_string(),
        permissions: letters.parse()?,
    })
}

pub async fn run<T: Transport>(reconciler: &Reconciler<T>, prefix: &str) -> Result<Value> {
    let names = Names {
        repository: format!("{}-r1", prefix),
        first_group: format!("{}-g1", prefix),
        second_group: format!("{}-g2", prefix),
        permission: format!("{}-p1", prefix),
    };

    let verified = verify(reconciler, &names).await;
    let cleaned = cleanup(reconciler, &names).await;
    verified?;
    cleaned?;

    info!(prefix = %prefix, "Smoke test passed");
    Ok(json!({
        "result": "passed",
        "repository": names.repository,
        "groups": [names.first_group, names.second_group],
        "permissionTarget": names.permission,
    }))
}

async fn verify<T: Transport>(reconciler: &Reconciler<T>, names: &Names) -> Result<()> {
    reconciler
        .ensure_repository(&names.repository, RepoClass::Local, "generic")
        .await?;
    reconciler
        .ensure_group(&names.first_group, Realm::Internal)
        .await?;
    reconciler
        .ensure_group(&names.second_group, Realm::Internal)
        .await?;

    reconciler
        .reconcile_permission_target(&PermissionGrant {
            name: names.permission.clone(),
            repositories: vec![names.repository.clone()],
            group: Some(group_grant(&names.first_group, "rd")?),
            public_read: true,
        })
        .await?;

    let target = reconciler.permission_target(&names.permission).await?;
    check(target.repositories == [names.repository.clone()], || {
        format!("unexpected repositories {:?}", target.repositories)
    })?;
    check(
        target
            .principals
            .groups
            .get(&names.first_group)
            .is_some_and(|perms| perms.to_string() == "rd"),
        || format!("group {} should hold rd", names.first_group),
    )?;
    check(target.anonymous_can_read(), || {
        "anonymous read should be granted".to_string()
    })?;

    reconciler
        .reconcile_permission_target(&PermissionGrant {
            name: names.permission.clone(),
            repositories: Vec::new(),
            group: Some(group_grant(&names.second_group, "m")?),
            public_read: true,
        })
        .await?;

    let target = reconciler.permission_target(&names.permission).await?;
    check(target.principals.groups.len() == 2, || {
        format!(
            "expected both groups, found {:?}",
            target.principals.groups.keys().collect::<Vec<_>>()
        )
    })?;
    check(target.repositories == [names.repository.clone()], || {
        format!("repositories changed to {:?}", target.repositories)
    })?;
    Ok(())
}

/// Delete in dependency order and confirm each resource is gone.
///
/// Every resource is attempted even after a failure; the first error is
/// returned.
async fn cleanup<T: Transport>(reconciler: &Reconciler<T>, names: &Names) -> Result<()> {
    let resources = [
        (ResourceKind::PermissionTarget, &names.permission),
        (ResourceKind::Group, &names.first_group),
        (ResourceKind::Group, &names.second_group),
        (ResourceKind::Repository, &names.repository),
    ];

    let mut first_error = None;
    for (kind, name) in resources {
        if let Err(e) = remove(reconciler, kind, name).await {
            warn!(kind = %kind, name = %name, error = %e, "Cleanup failed");
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

async fn remove<T: Transport>(
    reconciler: &Reconciler<T>,
    kind: ResourceKind,
    name: &str,
) -> Result<()> {
    match reconciler.delete(kind, name).await {
        Ok(()) => {}
        Err(e) if e.is_not_found() => warn!(kind = %kind, name = %name, "Already absent"),
        Err(e) => return Err(e),
    }
    match reconciler.fetch(kind, name).await {
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(e),
        Ok(_) => Err(Error::verification(format!(
            "{} '{}' still exists after delete",
            kind, name
        ))),
    }
}
