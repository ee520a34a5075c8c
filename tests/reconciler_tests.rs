//! Integration tests for the reconcilers
//!
//! These run every reconciliation against the in-memory Artifactory, which
//! reproduces the upstream's status-code quirks and records each request.

use artifactory_reconciler::client::{ApiResponse, ResourceKind};
use artifactory_reconciler::config::WritePolicy;
use artifactory_reconciler::model::{
    GroupGrant, PermissionGrant, PermissionTarget, Realm, RepoClass,
};
use artifactory_reconciler::testing::InMemoryArtifactory;
use artifactory_reconciler::{Error, Outcome, Reconciler};
use reqwest::Method;
use serde_json::json;

// ============================================================================
// Test Helpers
// ============================================================================

fn reconciler() -> Reconciler<InMemoryArtifactory> {
    Reconciler::new(InMemoryArtifactory::new(), WritePolicy::LastWriteWins)
}

fn reconciler_with(fake: InMemoryArtifactory, policy: WritePolicy) -> Reconciler<InMemoryArtifactory> {
    Reconciler::new(fake, policy)
}

fn grant(name: &str, repos: &[&str], group: Option<(&str, &str)>, public_read: bool) -> PermissionGrant {
    PermissionGrant {
        name: name.to_string(),
        repositories: repos.iter().map(|r| r.to_string()).collect(),
        group: group.map(|(group, letters)| GroupGrant {
            name: group.to_string(),
            permissions: letters.parse().unwrap(),
        }),
        public_read,
    }
}

fn stored_target(reconciler: &Reconciler<InMemoryArtifactory>, name: &str) -> PermissionTarget {
    let doc = reconciler
        .transport()
        .document(ResourceKind::PermissionTarget, name)
        .expect("permission target should exist");
    serde_json::from_value(doc).unwrap()
}

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
async fn ensure_repository_is_idempotent() {
    let reconciler = reconciler();

    let first = reconciler
        .ensure_repository("r1", RepoClass::Local, "generic")
        .await
        .unwrap();
    let after_first = reconciler
        .transport()
        .document(ResourceKind::Repository, "r1")
        .unwrap();
    let second = reconciler
        .ensure_repository("r1", RepoClass::Local, "generic")
        .await
        .unwrap();

    assert_eq!(first, Outcome::Created);
    assert_eq!(second, Outcome::Unchanged);
    assert_eq!(reconciler.transport().write_count(), 1);
    assert_eq!(
        reconciler
            .transport()
            .document(ResourceKind::Repository, "r1")
            .unwrap(),
        after_first
    );
    assert_eq!(after_first["repoLayoutRef"], json!("simple-default"));
}

#[tokio::test]
async fn ensure_repository_leaves_existing_config_alone() {
    let fake = InMemoryArtifactory::new().with_document(
        ResourceKind::Repository,
        "libs",
        json!({"rclass": "remote", "packageType": "maven", "repoLayoutRef": "maven-2-default"}),
    );
    let reconciler = reconciler_with(fake, WritePolicy::LastWriteWins);

    let outcome = reconciler
        .ensure_repository("libs", RepoClass::Local, "npm")
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(reconciler.transport().write_count(), 0);
    let repo = reconciler.repository("libs").await.unwrap();
    assert_eq!(repo.rclass, "remote");
}

#[tokio::test]
async fn fetching_a_repository_of_any_package_type() {
    let fake = InMemoryArtifactory::new().with_document(
        ResourceKind::Repository,
        "charts",
        json!({"rclass": "local", "packageType": "helm", "repoLayoutRef": "simple-default"}),
    );
    let reconciler = reconciler_with(fake, WritePolicy::LastWriteWins);

    let repo = reconciler.repository("charts").await.unwrap();

    assert_eq!(repo.key, "charts");
    assert_eq!(repo.package_type, "helm");
}

#[tokio::test]
async fn unknown_package_type_fails_before_any_request() {
    let reconciler = reconciler();

    let result = reconciler
        .ensure_repository("r1", RepoClass::Local, "cobol")
        .await;

    assert!(matches!(result, Err(Error::Config(_))));
    assert!(reconciler.transport().requests().is_empty());
}

#[tokio::test]
async fn repository_lookup_failure_does_not_create() {
    let reconciler = reconciler();
    reconciler.transport().fail_next(
        Method::GET,
        "repositories/r1",
        ApiResponse::new(500, "internal error"),
    );

    let result = reconciler
        .ensure_repository("r1", RepoClass::Local, "generic")
        .await;

    assert!(matches!(result, Err(Error::Upstream { status: 500, .. })));
    assert_eq!(reconciler.transport().write_count(), 0);
}

// ============================================================================
// Group Tests
// ============================================================================

#[tokio::test]
async fn ensure_group_creates_with_fixed_flags() {
    let reconciler = reconciler();

    let outcome = reconciler.ensure_group("g1", Realm::Crowd).await.unwrap();

    assert_eq!(outcome, Outcome::Created);
    let group = reconciler.group("g1").await.unwrap();
    assert_eq!(group.realm, Realm::Crowd);
    assert!(!group.auto_join);
    assert!(!group.admin_privileges);
}

#[tokio::test]
async fn ensure_group_never_updates_existing_group() {
    let fake = InMemoryArtifactory::new().with_document(
        ResourceKind::Group,
        "g1",
        json!({"realm": "ldap", "autoJoin": true, "adminPrivileges": false}),
    );
    let reconciler = reconciler_with(fake, WritePolicy::LastWriteWins);

    let outcome = reconciler.ensure_group("g1", Realm::Internal).await.unwrap();

    assert_eq!(outcome, Outcome::Unchanged);
    let group = reconciler.group("g1").await.unwrap();
    assert_eq!(group.realm, Realm::Ldap);
    assert!(group.auto_join);
}

#[tokio::test]
async fn group_400_is_an_error_not_absence() {
    let reconciler = reconciler();
    reconciler.transport().fail_next(
        Method::GET,
        "security/groups/g1",
        ApiResponse::new(400, "bad request"),
    );

    let result = reconciler.ensure_group("g1", Realm::Internal).await;

    assert!(matches!(result, Err(Error::Upstream { status: 400, .. })));
    assert!(!reconciler.transport().contains(ResourceKind::Group, "g1"));
}

// ============================================================================
// User Membership Tests
// ============================================================================

fn fake_with_user() -> InMemoryArtifactory {
    InMemoryArtifactory::new()
        .with_document(
            ResourceKind::User,
            "alice",
            json!({"email": "alice@example.com", "admin": false, "groups": ["readers"]}),
        )
        .with_document(ResourceKind::Group, "writers", json!({"realm": "internal"}))
}

#[tokio::test]
async fn add_user_to_group_twice_keeps_a_set() {
    let reconciler = reconciler_with(fake_with_user(), WritePolicy::LastWriteWins);

    let first = reconciler
        .add_user_to_group("alice", "writers")
        .await
        .unwrap();
    let groups_after_first = reconciler.user("alice").await.unwrap().groups;
    let writes_after_first = reconciler.transport().write_count();

    let second = reconciler
        .add_user_to_group("alice", "writers")
        .await
        .unwrap();
    let user = reconciler.user("alice").await.unwrap();

    assert_eq!(first, Outcome::Updated);
    assert_eq!(second, Outcome::Unchanged);
    assert_eq!(user.groups, groups_after_first);
    assert_eq!(user.groups, vec!["readers".to_string(), "writers".to_string()]);
    assert_eq!(reconciler.transport().write_count(), writes_after_first);
    assert_eq!(user.extra["admin"], json!(false));
}

#[tokio::test]
async fn add_user_to_group_uses_post() {
    let reconciler = reconciler_with(fake_with_user(), WritePolicy::LastWriteWins);

    reconciler
        .add_user_to_group("alice", "writers")
        .await
        .unwrap();

    let writes: Vec<_> = reconciler
        .transport()
        .requests()
        .into_iter()
        .filter(|r| r.is_write())
        .collect();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].method, Method::POST);
    assert_eq!(writes[0].path, "security/users/alice");
}

#[tokio::test]
async fn add_user_to_missing_group_or_user_is_not_found() {
    let reconciler = reconciler_with(fake_with_user(), WritePolicy::LastWriteWins);

    let missing_group = reconciler.add_user_to_group("alice", "ghosts").await;
    assert!(matches!(
        missing_group,
        Err(Error::NotFound { kind: ResourceKind::Group, .. })
    ));

    let missing_user = reconciler.add_user_to_group("bob", "writers").await;
    assert!(matches!(
        missing_user,
        Err(Error::NotFound { kind: ResourceKind::User, .. })
    ));

    assert_eq!(reconciler.transport().write_count(), 0);
}

// ============================================================================
// Permission Target Tests
// ============================================================================

#[tokio::test]
async fn absent_target_is_created_from_the_grant() {
    let reconciler = reconciler();

    let outcome = reconciler
        .reconcile_permission_target(&grant("p1", &["r1", "r2"], Some(("g1", "rd")), false))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Created);
    let target = stored_target(&reconciler, "p1");
    assert_eq!(target.repositories, vec!["r1".to_string(), "r2".to_string()]);
    assert_eq!(target.principals.groups.len(), 1);
    assert_eq!(target.principals.groups["g1"].to_string(), "rd");
    assert_eq!(
        reconciler
            .transport()
            .document(ResourceKind::PermissionTarget, "p1")
            .unwrap()["principals"]["users"]["anonymous"],
        json!([""])
    );
}

#[tokio::test]
async fn repositories_are_unioned_regardless_of_order() {
    for order in [["A", "B"], ["B", "A"]] {
        let reconciler = reconciler();
        for repo in order {
            reconciler
                .reconcile_permission_target(&grant("p1", &[repo], Some(("g1", "r")), false))
                .await
                .unwrap();
        }

        let mut repos = stored_target(&reconciler, "p1").repositories;
        repos.sort();
        assert_eq!(repos, vec!["A".to_string(), "B".to_string()]);
    }
}

#[tokio::test]
async fn repeating_a_repository_does_not_duplicate_it() {
    let reconciler = reconciler();
    let g = grant("p1", &["A"], Some(("g1", "r")), false);

    reconciler.reconcile_permission_target(&g).await.unwrap();
    let outcome = reconciler.reconcile_permission_target(&g).await.unwrap();

    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(stored_target(&reconciler, "p1").repositories, vec!["A".to_string()]);
    assert_eq!(reconciler.transport().write_count(), 1);
}

#[tokio::test]
async fn public_read_is_replaced_not_unioned() {
    let reconciler = reconciler();

    reconciler
        .reconcile_permission_target(&grant("p1", &["A"], Some(("g1", "r")), true))
        .await
        .unwrap();
    assert!(stored_target(&reconciler, "p1").anonymous_can_read());

    reconciler
        .reconcile_permission_target(&grant("p1", &["A"], Some(("g1", "r")), false))
        .await
        .unwrap();

    let doc = reconciler
        .transport()
        .document(ResourceKind::PermissionTarget, "p1")
        .unwrap();
    assert_eq!(doc["principals"]["users"]["anonymous"], json!([""]));
}

#[tokio::test]
async fn merge_keeps_other_groups_and_fields() {
    let fake = InMemoryArtifactory::new().with_document(
        ResourceKind::PermissionTarget,
        "p1",
        json!({
            "includesPattern": "**",
            "repositories": ["A"],
            "principals": {
                "users": {"anonymous": ["r"], "ci": ["w", "r"]},
                "groups": {"admins": ["m"], "g1": ["r"]}
            }
        }),
    );
    let reconciler = reconciler_with(fake, WritePolicy::LastWriteWins);

    let outcome = reconciler
        .reconcile_permission_target(&grant("p1", &["B"], Some(("g1", "rdw")), true))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Updated);
    let doc = reconciler
        .transport()
        .document(ResourceKind::PermissionTarget, "p1")
        .unwrap();
    assert_eq!(doc["includesPattern"], json!("**"));
    assert_eq!(doc["repositories"], json!(["A", "B"]));
    assert_eq!(doc["principals"]["groups"]["admins"], json!(["m"]));
    assert_eq!(doc["principals"]["groups"]["g1"], json!(["r", "d", "w"]));
    assert_eq!(doc["principals"]["users"]["ci"], json!(["w", "r"]));
}

#[tokio::test]
async fn merge_without_group_leaves_group_map_alone() {
    let reconciler = reconciler();
    reconciler
        .reconcile_permission_target(&grant("p1", &["A"], Some(("g1", "r")), false))
        .await
        .unwrap();

    reconciler
        .reconcile_permission_target(&grant("p1", &["B"], None, false))
        .await
        .unwrap();

    let target = stored_target(&reconciler, "p1");
    assert_eq!(target.principals.groups.len(), 1);
    assert!(target.principals.groups.contains_key("g1"));
}

#[tokio::test]
async fn upstream_auth_failure_does_not_create() {
    let reconciler = reconciler();
    reconciler.transport().fail_next(
        Method::GET,
        "security/permissions/p1",
        ApiResponse::new(401, "{\"errors\":[{\"status\":401}]}"),
    );

    let result = reconciler
        .reconcile_permission_target(&grant("p1", &["A"], Some(("g1", "r")), false))
        .await;

    match result {
        Err(Error::Upstream { status, body, .. }) => {
            assert_eq!(status, 401);
            assert!(body.contains("401"));
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
    assert_eq!(reconciler.transport().write_count(), 0);
}

#[tokio::test]
async fn creating_a_target_needs_a_repository() {
    let reconciler = reconciler();

    let result = reconciler
        .reconcile_permission_target(&grant("p1", &[], Some(("g1", "r")), false))
        .await;

    assert!(matches!(result, Err(Error::Config(_))));
    let requests = reconciler.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
}

#[tokio::test]
async fn reordered_group_permissions_are_unchanged() {
    let reconciler = reconciler();
    reconciler
        .reconcile_permission_target(&grant("p1", &["r1"], Some(("g1", "rd")), false))
        .await
        .unwrap();

    let outcome = reconciler
        .reconcile_permission_target(&grant("p1", &["r1"], Some(("g1", "dr")), false))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(reconciler.transport().write_count(), 1);
}

#[tokio::test]
async fn failed_write_surfaces_status_and_body() {
    let reconciler = reconciler();
    reconciler.transport().fail_next(
        Method::PUT,
        "security/permissions/p1",
        ApiResponse::new(400, "Principal 'g1' does not exist"),
    );

    let result = reconciler
        .reconcile_permission_target(&grant("p1", &["A"], Some(("g1", "r")), false))
        .await;

    match result {
        Err(Error::Upstream {
            method,
            status,
            body,
            ..
        }) => {
            assert_eq!(method, "PUT");
            assert_eq!(status, 400);
            assert!(body.contains("g1"));
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

// ============================================================================
// Concurrent Writer Tests
// ============================================================================

fn fake_with_target() -> InMemoryArtifactory {
    InMemoryArtifactory::new().with_document(
        ResourceKind::PermissionTarget,
        "p1",
        json!({
            "repositories": ["A"],
            "principals": {"users": {"anonymous": [""]}, "groups": {"g1": ["r"]}}
        }),
    )
}

fn concurrent_version() -> serde_json::Value {
    json!({
        "repositories": ["A"],
        "principals": {"users": {"anonymous": [""]}, "groups": {"g1": ["r"], "other": ["w"]}}
    })
}

#[tokio::test]
async fn last_write_wins_loses_a_concurrent_update() {
    let reconciler = reconciler_with(fake_with_target(), WritePolicy::LastWriteWins);
    reconciler
        .transport()
        .write_after_next_read(ResourceKind::PermissionTarget, "p1", concurrent_version());

    let outcome = reconciler
        .reconcile_permission_target(&grant("p1", &["A"], Some(("g2", "m")), false))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Updated);
    let target = stored_target(&reconciler, "p1");
    assert!(target.principals.groups.contains_key("g2"));
    assert!(!target.principals.groups.contains_key("other"));
}

#[tokio::test]
async fn reject_if_changed_detects_a_concurrent_update() {
    let reconciler = reconciler_with(fake_with_target(), WritePolicy::RejectIfChanged);
    reconciler
        .transport()
        .write_after_next_read(ResourceKind::PermissionTarget, "p1", concurrent_version());

    let result = reconciler
        .reconcile_permission_target(&grant("p1", &["A"], Some(("g2", "m")), false))
        .await;

    assert!(matches!(
        result,
        Err(Error::Conflict { kind: ResourceKind::PermissionTarget, .. })
    ));
    assert_eq!(reconciler.transport().write_count(), 0);
    let target = stored_target(&reconciler, "p1");
    assert!(target.principals.groups.contains_key("other"));
    assert!(!target.principals.groups.contains_key("g2"));
}

#[tokio::test]
async fn reject_if_changed_writes_when_nothing_changed() {
    let reconciler = reconciler_with(fake_with_target(), WritePolicy::RejectIfChanged);

    let outcome = reconciler
        .reconcile_permission_target(&grant("p1", &["B"], None, false))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Updated);
    assert_eq!(stored_target(&reconciler, "p1").repositories.len(), 2);
}

#[tokio::test]
async fn reject_if_changed_guards_user_membership() {
    let reconciler = reconciler_with(fake_with_user(), WritePolicy::RejectIfChanged);
    reconciler.transport().write_after_next_read(
        ResourceKind::User,
        "alice",
        json!({"groups": ["readers", "auditors"]}),
    );

    let result = reconciler.add_user_to_group("alice", "writers").await;

    assert!(matches!(result, Err(Error::Conflict { .. })));
    let user = reconciler.user("alice").await.unwrap();
    assert!(user.is_member_of("auditors"));
    assert!(!user.is_member_of("writers"));
}

// ============================================================================
// Delete Tests
// ============================================================================

#[tokio::test]
async fn deleting_an_absent_resource_is_not_found() {
    let reconciler = reconciler();

    let repo = reconciler.delete_repository("nope").await;
    let group = reconciler.delete_group("nope").await;
    let perm = reconciler.delete_permission_target("nope").await;
    let user = reconciler.delete_user("nope").await;

    for result in [repo, group, perm, user] {
        assert!(result.unwrap_err().is_not_found());
    }
}

// ============================================================================
// End-to-end Scenario
// ============================================================================

#[tokio::test]
async fn end_to_end_scenario() {
    let reconciler = reconciler();

    reconciler
        .ensure_repository("r1", RepoClass::Local, "generic")
        .await
        .unwrap();
    reconciler.ensure_group("g1", Realm::Internal).await.unwrap();
    reconciler
        .reconcile_permission_target(&grant("p1", &["r1"], Some(("g1", "rd")), true))
        .await
        .unwrap();

    let doc = reconciler
        .fetch(ResourceKind::PermissionTarget, "p1")
        .await
        .unwrap();
    assert_eq!(doc["repositories"], json!(["r1"]));
    assert_eq!(doc["principals"]["groups"]["g1"], json!(["r", "d"]));
    assert_eq!(doc["principals"]["users"]["anonymous"], json!(["r"]));

    reconciler
        .reconcile_permission_target(&grant("p1", &["r1"], Some(("g2", "m")), true))
        .await
        .unwrap();

    let doc = reconciler
        .fetch(ResourceKind::PermissionTarget, "p1")
        .await
        .unwrap();
    assert_eq!(doc["repositories"], json!(["r1"]));
    assert_eq!(doc["principals"]["groups"]["g1"], json!(["r", "d"]));
    assert_eq!(doc["principals"]["groups"]["g2"], json!(["m"]));

    reconciler.delete_permission_target("p1").await.unwrap();
    reconciler.delete_group("g1").await.unwrap();
    reconciler.delete_repository("r1").await.unwrap();

    for (kind, name) in [
        (ResourceKind::PermissionTarget, "p1"),
        (ResourceKind::Group, "g1"),
        (ResourceKind::Repository, "r1"),
    ] {
        let result = reconciler.fetch(kind, name).await;
        assert!(
            matches!(result, Err(Error::NotFound { kind: k, .. }) if k == kind),
            "{} {} should be gone",
            kind,
            name
        );
    }
}
