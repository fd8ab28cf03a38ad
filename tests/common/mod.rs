//! Shared helpers for integration tests.
//!
//! [`FaultyGroupsApi`] wraps the in-memory transport and injects remote
//! rejections, cancellation and misbehaving pagination.

#![allow(dead_code)]

use okta_provider::client::{GroupsApi, InMemoryGroupsApi, MemberPage};
use okta_provider::models::{Group, GroupProfile};
use okta_provider::value_objects::{MemberSet, ResourceId};
use okta_provider::{ProviderError, ProviderResult};
use tokio_util::sync::CancellationToken;

/// Initialise logging once; repeated calls are ignored.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn id(value: &str) -> ResourceId {
    ResourceId::new(value.to_string()).unwrap()
}

pub fn members(values: &[&str]) -> MemberSet {
    MemberSet::try_from_strs(values).unwrap()
}

/// A rejection as Okta would report it for a forbidden write.
pub fn forbidden(operation: &str) -> ProviderError {
    ProviderError::Api {
        operation: operation.to_string(),
        status: 403,
        error_code: Some("E0000006".to_string()),
        summary: "You do not have permission to perform the requested action".to_string(),
        causes: Vec::new(),
    }
}

/// Faults to inject, keyed by member ID.
#[derive(Clone, Default)]
pub struct Faults {
    /// Reject the add of this member
    pub fail_add: Option<String>,
    /// Reject the remove of this member
    pub fail_remove: Option<String>,
    /// Cancel the token while this member's add is in flight
    pub cancel_during_add: Option<(String, CancellationToken)>,
    /// Answer every listing with the same non-empty cursor
    pub looping_cursor: bool,
    /// Reject every group read
    pub fail_get: bool,
    /// Report every group as missing on read
    pub hide_groups: bool,
}

/// In-memory transport with injectable failures.
///
/// Injected failures never reach the inner transport, so they are absent from
/// its call journal.
#[derive(Clone)]
pub struct FaultyGroupsApi {
    pub inner: InMemoryGroupsApi,
    faults: Faults,
}

impl FaultyGroupsApi {
    pub fn new(inner: InMemoryGroupsApi, faults: Faults) -> Self {
        Self { inner, faults }
    }
}

impl GroupsApi for FaultyGroupsApi {
    async fn create_group(&self, profile: &GroupProfile) -> ProviderResult<Group> {
        self.inner.create_group(profile).await
    }

    async fn get_group(&self, group_id: &ResourceId) -> ProviderResult<Option<Group>> {
        if self.faults.fail_get {
            return Err(forbidden(&format!("read group {}", group_id)));
        }
        if self.faults.hide_groups {
            return Ok(None);
        }
        self.inner.get_group(group_id).await
    }

    async fn update_group(
        &self,
        group_id: &ResourceId,
        profile: &GroupProfile,
    ) -> ProviderResult<Group> {
        self.inner.update_group(group_id, profile).await
    }

    async fn delete_group(&self, group_id: &ResourceId) -> ProviderResult<()> {
        self.inner.delete_group(group_id).await
    }

    async fn list_group_users(
        &self,
        group_id: &ResourceId,
        after: Option<&str>,
    ) -> ProviderResult<MemberPage> {
        let mut page = self.inner.list_group_users(group_id, after).await?;
        if self.faults.looping_cursor {
            page.next = Some("stuck".to_string());
        }
        Ok(page)
    }

    async fn add_user_to_group(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> ProviderResult<()> {
        if let Some((member, token)) = &self.faults.cancel_during_add {
            if member == user_id.as_str() {
                token.cancel();
                std::future::pending::<()>().await;
            }
        }
        if self.faults.fail_add.as_deref() == Some(user_id.as_str()) {
            return Err(forbidden(&format!("add user {} to group {}", user_id, group_id)));
        }
        self.inner.add_user_to_group(group_id, user_id).await
    }

    async fn remove_user_from_group(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> ProviderResult<()> {
        if self.faults.fail_remove.as_deref() == Some(user_id.as_str()) {
            return Err(forbidden(&format!(
                "remove user {} from group {}",
                user_id, group_id
            )));
        }
        self.inner.remove_user_from_group(group_id, user_id).await
    }
}
