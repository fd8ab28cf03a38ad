//! Integration tests for membership reconciliation against the in-memory
//! transport, including injected failures and cancellation.

mod common;

use common::{FaultyGroupsApi, Faults, id, init_logging, members};
use futures::future::join_all;
use okta_provider::client::{InMemoryGroupsApi, RemoteCall};
use okta_provider::error::MemberOperation;
use okta_provider::membership::{MembershipReconciler, ReconcileOutcome, diff};
use okta_provider::{ProviderError, ResourceId};
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

async fn group_with(api: &InMemoryGroupsApi, name: &str, initial: &[&str]) -> ResourceId {
    let group_id = api.seed_group(name, None).await;
    api.seed_members(&group_id, initial).await.unwrap();
    group_id
}

fn add(group_id: &ResourceId, member: &str) -> RemoteCall {
    RemoteCall::AddMember {
        group_id: group_id.to_string(),
        member_id: member.to_string(),
    }
}

fn remove(group_id: &ResourceId, member: &str) -> RemoteCall {
    RemoteCall::RemoveMember {
        group_id: group_id.to_string(),
        member_id: member.to_string(),
    }
}

fn writes(calls: Vec<RemoteCall>) -> Vec<RemoteCall> {
    calls.into_iter().filter(RemoteCall::is_write).collect()
}

#[tokio::test]
async fn test_end_to_end_alice_bob_carol() {
    init_logging();
    let api = InMemoryGroupsApi::new();
    let group_id = group_with(&api, "Engineering", &["bob", "carol"]).await;
    let reconciler = MembershipReconciler::new(&api);
    let cancel = CancellationToken::new();

    let desired = members(&["alice", "bob"]);
    let observed = assert_ok!(
        reconciler
            .sync(&group_id, false, &Default::default(), &cancel)
            .await
    );
    assert_eq!(observed, members(&["bob", "carol"]));

    let changes = diff(&desired, &observed);
    assert_eq!(changes.to_add, members(&["alice"]));
    assert_eq!(changes.to_remove, members(&["carol"]));

    api.clear_calls().await;
    let report = assert_ok!(reconciler.apply(&group_id, false, &changes, &cancel).await);
    assert_eq!((report.added, report.removed, report.tolerated), (1, 1, 0));
    assert_eq!(
        api.calls().await,
        vec![add(&group_id, "alice"), remove(&group_id, "carol")]
    );

    let after = assert_ok!(
        reconciler
            .sync(&group_id, false, &Default::default(), &cancel)
            .await
    );
    assert_eq!(after, desired);
    assert!(diff(&desired, &after).is_empty());
}

#[tokio::test]
async fn test_failed_add_stops_before_any_remove() {
    init_logging();
    let inner = InMemoryGroupsApi::new();
    let group_id = group_with(&inner, "Engineering", &["u3"]).await;
    let api = FaultyGroupsApi::new(
        inner.clone(),
        Faults {
            fail_add: Some("u2".to_string()),
            ..Faults::default()
        },
    );
    let reconciler = MembershipReconciler::new(&api);

    let changes = diff(&members(&["u1", "u2"]), &members(&["u3"]));
    let err = assert_err!(
        reconciler
            .apply(&group_id, false, &changes, &CancellationToken::new())
            .await
    );

    match &err {
        ProviderError::Membership {
            operation,
            member_id,
            source,
            ..
        } => {
            assert_eq!(*operation, MemberOperation::Add);
            assert_eq!(member_id.as_str(), "u2");
            assert!(matches!(**source, ProviderError::Api { status: 403, .. }));
        }
        other => panic!("Expected Membership error, got: {:?}", other),
    }
    assert!(err.to_string().contains("u2"));

    // u1 stays added, u3 was never touched
    assert_eq!(writes(inner.calls().await), vec![add(&group_id, "u1")]);
    assert_eq!(inner.members_of(&group_id).await, members(&["u1", "u3"]));
}

#[tokio::test]
async fn test_failed_remove_stops_remaining_removes() {
    let inner = InMemoryGroupsApi::new();
    let group_id = group_with(&inner, "Engineering", &["r1", "r2", "r3"]).await;
    let api = FaultyGroupsApi::new(
        inner.clone(),
        Faults {
            fail_remove: Some("r2".to_string()),
            ..Faults::default()
        },
    );
    let reconciler = MembershipReconciler::new(&api);

    let changes = diff(&members(&["a1"]), &members(&["r1", "r2", "r3"]));
    let err = assert_err!(
        reconciler
            .apply(&group_id, false, &changes, &CancellationToken::new())
            .await
    );
    assert!(matches!(
        err,
        ProviderError::Membership {
            operation: MemberOperation::Remove,
            ..
        }
    ));

    assert_eq!(
        writes(inner.calls().await),
        vec![add(&group_id, "a1"), remove(&group_id, "r1")]
    );
}

#[tokio::test]
async fn test_stale_diff_duplicates_are_tolerated() {
    let api = InMemoryGroupsApi::new();
    let group_id = group_with(&api, "Engineering", &["u1"]).await;
    let reconciler = MembershipReconciler::new(&api);

    // Computed against an out-of-date view: u1 is already in, ghost already gone
    let changes = diff(&members(&["u1", "u2"]), &members(&["ghost"]));
    let report = assert_ok!(
        reconciler
            .apply(&group_id, false, &changes, &CancellationToken::new())
            .await
    );

    assert_eq!(report.added, 1);
    assert_eq!(report.removed, 0);
    assert_eq!(report.tolerated, 2);
    assert_eq!(api.members_of(&group_id).await, members(&["u1", "u2"]));
}

#[tokio::test]
async fn test_skip_flag_makes_no_remote_calls() {
    let api = InMemoryGroupsApi::new();
    let group_id = group_with(&api, "Engineering", &["u1"]).await;
    let reconciler = MembershipReconciler::new(&api);
    let cancel = CancellationToken::new();
    let stored = members(&["remembered"]);

    let synced = assert_ok!(reconciler.sync(&group_id, true, &stored, &cancel).await);
    assert_eq!(synced, stored);

    let changes = diff(&members(&["u2"]), &members(&["u1"]));
    let report = assert_ok!(reconciler.apply(&group_id, true, &changes, &cancel).await);
    assert!(report.skipped);
    assert_eq!(report.added + report.removed + report.tolerated, 0);

    assert!(api.calls().await.is_empty());
    assert_eq!(api.members_of(&group_id).await, members(&["u1"]));
}

#[tokio::test]
async fn test_cancellation_mid_apply_stops_further_calls() {
    init_logging();
    let inner = InMemoryGroupsApi::new();
    let group_id = group_with(&inner, "Engineering", &["u3"]).await;
    let cancel = CancellationToken::new();
    let api = FaultyGroupsApi::new(
        inner.clone(),
        Faults {
            cancel_during_add: Some(("u2".to_string(), cancel.clone())),
            ..Faults::default()
        },
    );
    let reconciler = MembershipReconciler::new(&api);

    let changes = diff(&members(&["u1", "u2"]), &members(&["u3"]));
    let err = assert_err!(reconciler.apply(&group_id, false, &changes, &cancel).await);

    assert!(err.is_cancelled());
    assert!(!matches!(err, ProviderError::Api { .. }));
    assert_eq!(writes(inner.calls().await), vec![add(&group_id, "u1")]);
    assert!(inner.members_of(&group_id).await.contains(&id("u3")));
}

#[tokio::test]
async fn test_sync_rejects_repeating_cursor() {
    let inner = InMemoryGroupsApi::with_page_size(1);
    let group_id = group_with(&inner, "Engineering", &["u1"]).await;
    let api = FaultyGroupsApi::new(
        inner.clone(),
        Faults {
            looping_cursor: true,
            ..Faults::default()
        },
    );
    let reconciler = MembershipReconciler::new(&api);

    let err = assert_err!(
        reconciler
            .sync(&group_id, false, &Default::default(), &CancellationToken::new())
            .await
    );
    assert!(matches!(err, ProviderError::Internal { .. }));
    assert_eq!(inner.calls().await.len(), 2);
}

#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let api = InMemoryGroupsApi::with_page_size(3);
    let group_id = group_with(&api, "Engineering", &["u1", "u5", "u6", "u7"]).await;
    let reconciler = MembershipReconciler::new(&api);
    let cancel = CancellationToken::new();
    let desired = members(&["u1", "u2", "u3", "u4"]);

    let first = assert_ok!(reconciler.reconcile(&group_id, false, &desired, &cancel).await);
    match first {
        ReconcileOutcome::Applied { diff, report } => {
            assert_eq!(diff.to_add, members(&["u2", "u3", "u4"]));
            assert_eq!(diff.to_remove, members(&["u5", "u6", "u7"]));
            assert_eq!((report.added, report.removed), (3, 3));
        }
        other => panic!("Expected Applied, got: {:?}", other),
    }

    api.clear_calls().await;
    let second = assert_ok!(reconciler.reconcile(&group_id, false, &desired, &cancel).await);
    assert_eq!(second, ReconcileOutcome::InSync { observed: desired });
    assert!(writes(api.calls().await).is_empty());
}

#[tokio::test]
async fn test_concurrent_groups_do_not_interfere() {
    let api = InMemoryGroupsApi::with_page_size(2);
    let reconciler = MembershipReconciler::new(api.clone());
    let cancel = CancellationToken::new();

    let mut groups = Vec::new();
    for n in 0..8 {
        let group_id = group_with(&api, &format!("Team {}", n), &["shared", "old"]).await;
        let own = format!("member-{}", n);
        let desired = members(&["shared", own.as_str()]);
        groups.push((group_id, desired));
    }

    let results = join_all(
        groups
            .iter()
            .map(|(group_id, desired)| reconciler.reconcile(group_id, false, desired, &cancel)),
    )
    .await;

    for result in results {
        assert_ok!(result);
    }
    for (group_id, desired) in &groups {
        assert_eq!(&api.members_of(group_id).await, desired);
    }
}
