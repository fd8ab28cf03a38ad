//! Applies membership diffs and reads observed membership.

use crate::client::{GroupsApi, cancellable};
use crate::error::{MemberOperation, ProviderError, ProviderResult};
use crate::membership::{MembershipDiff, diff};
use crate::value_objects::{MemberSet, ResourceId};
use log::{debug, trace, warn};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

/// Counts of what [`MembershipReconciler::apply`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Members added by a successful call
    pub added: usize,
    /// Members removed by a successful call
    pub removed: usize,
    /// Calls that reported the change was already in place
    pub tolerated: usize,
    /// True when the skip flag suppressed every call
    pub skipped: bool,
}

impl ApplyReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Result of a full [`MembershipReconciler::reconcile`] pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The skip flag was set; nothing was read or written.
    Skipped,
    /// Remote membership already matched the desired set.
    InSync { observed: MemberSet },
    /// Changes were applied.
    Applied {
        diff: MembershipDiff,
        report: ApplyReport,
    },
}

/// Reconciles a group's membership through a [`GroupsApi`].
///
/// The reconciler holds no membership state of its own. Every call starts from
/// the sets it is given or fetches them fresh, so one reconciler can serve any
/// number of groups concurrently.
#[derive(Debug, Clone)]
pub struct MembershipReconciler<C> {
    client: C,
}

impl<C: GroupsApi> MembershipReconciler<C> {
    /// Create a reconciler that talks to Okta through `client`.
    ///
    /// # Arguments
    ///
    /// * `client` - Any [`GroupsApi`]; pass `&client` or an `Arc` to share one
    ///   transport between several reconcilers
    ///
    /// # Examples
    ///
    /// ```rust
    /// use okta_provider::client::InMemoryGroupsApi;
    /// use okta_provider::membership::MembershipReconciler;
    ///
    /// let api = InMemoryGroupsApi::new();
    /// let reconciler = MembershipReconciler::new(&api);
    /// assert!(std::ptr::eq(*reconciler.client(), &api));
    /// ```
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The transport this reconciler issues calls through.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Issue the calls described by `diff`.
    ///
    /// Adds go first, in ascending ID order, and removes follow only once every
    /// add has succeeded. The first failing call ends the whole operation with
    /// [`ProviderError::Membership`] naming the member; changes already made
    /// stay in place. An add reported as "already a member" or a remove
    /// reported as "not a member" counts as done.
    pub async fn apply(
        &self,
        group_id: &ResourceId,
        skip_users: bool,
        diff: &MembershipDiff,
        cancel: &CancellationToken,
    ) -> ProviderResult<ApplyReport> {
        if skip_users {
            debug!("Skipping membership changes for group {}", group_id);
            return Ok(ApplyReport::skipped());
        }

        let mut report = ApplyReport::default();

        for member in &diff.to_add {
            debug!("Adding user {} to group {}", member, group_id);
            let result = cancellable(
                cancel,
                || format!("add user {} to group {}", member, group_id),
                self.client.add_user_to_group(group_id, member),
            )
            .await;

            match result {
                Ok(()) => report.added += 1,
                Err(e) if e.is_already_member() => {
                    warn!("User {} was already a member of group {}", member, group_id);
                    report.tolerated += 1;
                }
                Err(e) => {
                    return Err(ProviderError::membership(
                        MemberOperation::Add,
                        group_id,
                        member,
                        e,
                    ));
                }
            }
        }

        for member in &diff.to_remove {
            debug!("Removing user {} from group {}", member, group_id);
            let result = cancellable(
                cancel,
                || format!("remove user {} from group {}", member, group_id),
                self.client.remove_user_from_group(group_id, member),
            )
            .await;

            match result {
                Ok(()) => report.removed += 1,
                Err(e) if e.is_not_member() => {
                    warn!("User {} was not a member of group {}", member, group_id);
                    report.tolerated += 1;
                }
                Err(e) => {
                    return Err(ProviderError::membership(
                        MemberOperation::Remove,
                        group_id,
                        member,
                        e,
                    ));
                }
            }
        }

        debug!(
            "Group {} membership applied: {} added, {} removed, {} already in place",
            group_id, report.added, report.removed, report.tolerated
        );
        Ok(report)
    }

    /// Fetch the group's current members, following pagination to the end.
    ///
    /// With `skip_users` set nothing is fetched and `stored` is returned as is.
    pub async fn sync(
        &self,
        group_id: &ResourceId,
        skip_users: bool,
        stored: &MemberSet,
        cancel: &CancellationToken,
    ) -> ProviderResult<MemberSet> {
        if skip_users {
            debug!("Skipping membership read for group {}", group_id);
            return Ok(stored.clone());
        }

        let mut observed = MemberSet::new();
        let mut seen_cursors = HashSet::new();
        let mut after: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = cancellable(
                cancel,
                || format!("list members of group {}", group_id),
                self.client.list_group_users(group_id, after.as_deref()),
            )
            .await?;
            pages += 1;
            trace!(
                "Group {} page {}: {} members",
                group_id,
                pages,
                page.members.len()
            );
            observed.extend(page.members);

            match page.next {
                None => break,
                Some(next) => {
                    if !seen_cursors.insert(next.clone()) {
                        return Err(ProviderError::internal(format!(
                            "member listing for group {} repeated cursor '{}'",
                            group_id, next
                        )));
                    }
                    after = Some(next);
                }
            }
        }

        debug!(
            "Group {} has {} members across {} pages",
            group_id,
            observed.len(),
            pages
        );
        Ok(observed)
    }

    /// Bring the group's membership to `desired`: sync, diff, then apply.
    pub async fn reconcile(
        &self,
        group_id: &ResourceId,
        skip_users: bool,
        desired: &MemberSet,
        cancel: &CancellationToken,
    ) -> ProviderResult<ReconcileOutcome> {
        if skip_users {
            return Ok(ReconcileOutcome::Skipped);
        }

        let observed = self.sync(group_id, false, &MemberSet::new(), cancel).await?;
        let changes = diff(desired, &observed);
        if changes.is_empty() {
            debug!("Group {} membership already in sync", group_id);
            return Ok(ReconcileOutcome::InSync { observed });
        }

        let report = self.apply(group_id, false, &changes, cancel).await?;
        Ok(ReconcileOutcome::Applied {
            diff: changes,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{InMemoryGroupsApi, RemoteCall};

    fn set(ids: &[&str]) -> MemberSet {
        MemberSet::try_from_strs(ids).unwrap()
    }

    async fn seeded(members: &[&str], page_size: usize) -> (InMemoryGroupsApi, ResourceId) {
        let api = InMemoryGroupsApi::with_page_size(page_size);
        let group_id = api.seed_group("Engineering", None).await;
        api.seed_members(&group_id, members).await.unwrap();
        (api, group_id)
    }

    #[tokio::test]
    async fn test_apply_adds_before_removes() {
        let (api, group_id) = seeded(&["bob", "carol"], 10).await;
        let reconciler = MembershipReconciler::new(&api);
        let changes = diff(&set(&["alice", "bob"]), &set(&["bob", "carol"]));

        let report = reconciler
            .apply(&group_id, false, &changes, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.added, 1);
        assert_eq!(report.removed, 1);
        assert_eq!(
            api.calls().await,
            vec![
                RemoteCall::AddMember {
                    group_id: group_id.to_string(),
                    member_id: "alice".to_string()
                },
                RemoteCall::RemoveMember {
                    group_id: group_id.to_string(),
                    member_id: "carol".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_skip_flag_issues_no_calls() {
        let (api, group_id) = seeded(&["u1"], 10).await;
        let reconciler = MembershipReconciler::new(&api);
        let cancel = CancellationToken::new();
        let stored = set(&["stale"]);

        let report = reconciler
            .apply(&group_id, true, &diff(&set(&["u2"]), &stored), &cancel)
            .await
            .unwrap();
        assert!(report.skipped);

        let synced = reconciler.sync(&group_id, true, &stored, &cancel).await.unwrap();
        assert_eq!(synced, stored);

        let outcome = reconciler
            .reconcile(&group_id, true, &set(&["u2"]), &cancel)
            .await
            .unwrap();
        assert_eq!(outcome, ReconcileOutcome::Skipped);

        assert!(api.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_sync_follows_every_page() {
        let (api, group_id) = seeded(&["u1", "u2", "u3", "u4", "u5"], 2).await;
        let reconciler = MembershipReconciler::new(&api);

        let observed = reconciler
            .sync(&group_id, false, &MemberSet::new(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(observed, set(&["u1", "u2", "u3", "u4", "u5"]));
        assert_eq!(api.calls().await.len(), 3);
    }

    #[tokio::test]
    async fn test_reconcile_in_sync_writes_nothing() {
        let (api, group_id) = seeded(&["u1", "u2"], 10).await;
        let reconciler = MembershipReconciler::new(&api);

        let outcome = reconciler
            .reconcile(&group_id, false, &set(&["u2", "u1"]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ReconcileOutcome::InSync {
                observed: set(&["u1", "u2"])
            }
        );
        assert!(
            api.calls()
                .await
                .iter()
                .all(|call| matches!(call, RemoteCall::ListMembers { .. }))
        );
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_first_call() {
        let (api, group_id) = seeded(&[], 10).await;
        let reconciler = MembershipReconciler::new(&api);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = reconciler
            .apply(&group_id, false, &diff(&set(&["u1"]), &MemberSet::new()), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(api.calls().await.is_empty());
    }
}
