//! Remote client abstraction for the Okta Groups API.
//!
//! [`GroupsApi`] is the seam between the group resource and the network. The
//! resource controller and the membership reconciler receive an implementation
//! explicitly; nothing in this crate reaches for a global client.
//!
//! # Implementations
//!
//! * [`OktaClient`] - HTTP transport against a live Okta org
//! * [`InMemoryGroupsApi`] - substitute transport for tests and dry runs; it
//!   records every call it receives
//!
//! # Example
//!
//! ```rust
//! use okta_provider::client::{GroupsApi, InMemoryGroupsApi};
//! use okta_provider::models::GroupProfile;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = InMemoryGroupsApi::new();
//! let group = api.create_group(&GroupProfile::new("Engineering", None)).await?;
//! assert!(group.id.starts_with("00g"));
//! # Ok(())
//! # }
//! ```

pub mod http;
pub mod in_memory;

pub use http::OktaClient;
pub use in_memory::{InMemoryGroupsApi, InMemoryStats, RemoteCall};

use crate::error::{ProviderError, ProviderResult};
use crate::models::{Group, GroupProfile};
use crate::value_objects::ResourceId;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One page of a group membership listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberPage {
    /// Member IDs on this page, in the order the remote returned them
    pub members: Vec<ResourceId>,
    /// Cursor for the next page; `None` when the listing is exhausted
    pub next: Option<String>,
}

/// Run one remote call unless `cancel` fires first.
///
/// The token is checked before the call is started and raced against it while
/// it is in flight. `operation` names the call in the resulting
/// [`ProviderError::Cancelled`].
pub async fn cancellable<T, F, N>(
    cancel: &CancellationToken,
    operation: N,
    call: F,
) -> ProviderResult<T>
where
    F: Future<Output = ProviderResult<T>>,
    N: FnOnce() -> String,
{
    if cancel.is_cancelled() {
        return Err(ProviderError::cancelled(operation()));
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProviderError::cancelled(operation())),
        result = call => result,
    }
}

/// Operations the group resource needs from Okta.
///
/// Every method is a single remote call. Implementations must not retry
/// membership changes on their own and must report duplicates faithfully:
/// adding an existing member yields an error for which
/// [`ProviderError::is_already_member`](crate::ProviderError::is_already_member)
/// holds, and removing a non-member yields one for which
/// [`ProviderError::is_not_member`](crate::ProviderError::is_not_member) holds.
pub trait GroupsApi {
    /// Create a group and return it with its server-assigned ID.
    fn create_group(
        &self,
        profile: &GroupProfile,
    ) -> impl Future<Output = ProviderResult<Group>> + Send;

    /// Fetch a group. Returns `None` if it does not exist.
    fn get_group(
        &self,
        group_id: &ResourceId,
    ) -> impl Future<Output = ProviderResult<Option<Group>>> + Send;

    /// Replace a group's profile.
    fn update_group(
        &self,
        group_id: &ResourceId,
        profile: &GroupProfile,
    ) -> impl Future<Output = ProviderResult<Group>> + Send;

    /// Delete a group.
    fn delete_group(&self, group_id: &ResourceId)
    -> impl Future<Output = ProviderResult<()>> + Send;

    /// Fetch one page of group members, starting after `after` when given.
    fn list_group_users(
        &self,
        group_id: &ResourceId,
        after: Option<&str>,
    ) -> impl Future<Output = ProviderResult<MemberPage>> + Send;

    /// Add a user to a group.
    fn add_user_to_group(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> impl Future<Output = ProviderResult<()>> + Send;

    /// Remove a user from a group.
    fn remove_user_from_group(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> impl Future<Output = ProviderResult<()>> + Send;
}

impl<T: GroupsApi + Sync> GroupsApi for &T {
    fn create_group(
        &self,
        profile: &GroupProfile,
    ) -> impl Future<Output = ProviderResult<Group>> + Send {
        (**self).create_group(profile)
    }

    fn get_group(
        &self,
        group_id: &ResourceId,
    ) -> impl Future<Output = ProviderResult<Option<Group>>> + Send {
        (**self).get_group(group_id)
    }

    fn update_group(
        &self,
        group_id: &ResourceId,
        profile: &GroupProfile,
    ) -> impl Future<Output = ProviderResult<Group>> + Send {
        (**self).update_group(group_id, profile)
    }

    fn delete_group(
        &self,
        group_id: &ResourceId,
    ) -> impl Future<Output = ProviderResult<()>> + Send {
        (**self).delete_group(group_id)
    }

    fn list_group_users(
        &self,
        group_id: &ResourceId,
        after: Option<&str>,
    ) -> impl Future<Output = ProviderResult<MemberPage>> + Send {
        (**self).list_group_users(group_id, after)
    }

    fn add_user_to_group(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> impl Future<Output = ProviderResult<()>> + Send {
        (**self).add_user_to_group(group_id, user_id)
    }

    fn remove_user_from_group(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> impl Future<Output = ProviderResult<()>> + Send {
        (**self).remove_user_from_group(group_id, user_id)
    }
}

impl<T: GroupsApi + Send + Sync> GroupsApi for Arc<T> {
    fn create_group(
        &self,
        profile: &GroupProfile,
    ) -> impl Future<Output = ProviderResult<Group>> + Send {
        (**self).create_group(profile)
    }

    fn get_group(
        &self,
        group_id: &ResourceId,
    ) -> impl Future<Output = ProviderResult<Option<Group>>> + Send {
        (**self).get_group(group_id)
    }

    fn update_group(
        &self,
        group_id: &ResourceId,
        profile: &GroupProfile,
    ) -> impl Future<Output = ProviderResult<Group>> + Send {
        (**self).update_group(group_id, profile)
    }

    fn delete_group(
        &self,
        group_id: &ResourceId,
    ) -> impl Future<Output = ProviderResult<()>> + Send {
        (**self).delete_group(group_id)
    }

    fn list_group_users(
        &self,
        group_id: &ResourceId,
        after: Option<&str>,
    ) -> impl Future<Output = ProviderResult<MemberPage>> + Send {
        (**self).list_group_users(group_id, after)
    }

    fn add_user_to_group(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> impl Future<Output = ProviderResult<()>> + Send {
        (**self).add_user_to_group(group_id, user_id)
    }

    fn remove_user_from_group(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> impl Future<Output = ProviderResult<()>> + Send {
        (**self).remove_user_from_group(group_id, user_id)
    }
}
