//! In-memory implementation of [`GroupsApi`].
//!
//! Behaves like a strict Okta org:
//!
//! * adding an existing member fails with [`ProviderError::AlreadyMember`]
//! * removing an absent member fails with [`ProviderError::NotMember`]
//! * operations on unknown groups fail with [`ProviderError::NotFound`]
//! * member listings are paginated in ascending ID order, with the last ID
//!   of a page serving as the `after` cursor for the next one
//!
//! Every call is appended to a journal, which tests use to assert exactly
//! which remote operations were issued and in what order.
//!
//! # Example Usage
//!
//! ```rust
//! use okta_provider::client::{GroupsApi, InMemoryGroupsApi, RemoteCall};
//! use okta_provider::value_objects::ResourceId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = InMemoryGroupsApi::with_page_size(2);
//! let group_id = api.seed_group("Engineering", None).await;
//! api.seed_members(&group_id, ["u1", "u2", "u3"]).await?;
//!
//! let first = api.list_group_users(&group_id, None).await?;
//! assert_eq!(first.members.len(), 2);
//! assert_eq!(first.next.as_deref(), Some("u2"));
//!
//! let user = ResourceId::new("u4".to_string())?;
//! api.add_user_to_group(&group_id, &user).await?;
//! assert!(matches!(api.calls().await.last(), Some(RemoteCall::AddMember { .. })));
//! # Ok(())
//! # }
//! ```

use crate::client::{GroupsApi, MemberPage};
use crate::error::{ProviderError, ProviderResult, ValidationResult};
use crate::models::{Group, GroupProfile, GroupType};
use crate::value_objects::{MemberSet, ResourceId};
use chrono::Utc;
use log::{debug, trace};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

const DEFAULT_PAGE_SIZE: usize = 200;

/// A remote operation as recorded by [`InMemoryGroupsApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    CreateGroup { name: String },
    GetGroup { group_id: String },
    UpdateGroup { group_id: String, name: String },
    DeleteGroup { group_id: String },
    ListMembers { group_id: String, after: Option<String> },
    AddMember { group_id: String, member_id: String },
    RemoveMember { group_id: String, member_id: String },
}

impl RemoteCall {
    /// Whether this call reads or writes group membership.
    pub fn touches_membership(&self) -> bool {
        matches!(
            self,
            RemoteCall::ListMembers { .. }
                | RemoteCall::AddMember { .. }
                | RemoteCall::RemoveMember { .. }
        )
    }

    /// Whether this call adds or removes a group member.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            RemoteCall::AddMember { .. } | RemoteCall::RemoveMember { .. }
        )
    }
}

#[derive(Default)]
struct OrgState {
    groups: HashMap<String, Group>,
    members: HashMap<String, BTreeSet<ResourceId>>,
    calls: Vec<RemoteCall>,
}

/// Thread-safe in-memory Okta org.
///
/// Clones share the same underlying state.
#[derive(Clone)]
pub struct InMemoryGroupsApi {
    state: Arc<RwLock<OrgState>>,
    page_size: usize,
}

/// Counters describing the in-memory org, for debugging and assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryStats {
    pub group_count: usize,
    pub membership_count: usize,
    pub call_count: usize,
}

impl InMemoryGroupsApi {
    /// Create an empty org with Okta's default page size.
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create an empty org that returns at most `page_size` members per page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(OrgState::default())),
            page_size: page_size.max(1),
        }
    }

    /// Insert a group directly, without recording a call.
    pub async fn seed_group(&self, name: &str, description: Option<&str>) -> ResourceId {
        let group = Self::new_group(GroupProfile::new(name, description.map(str::to_string)));
        let id = ResourceId::new_unchecked(group.id.clone());
        let mut state = self.state.write().await;
        state.members.insert(group.id.clone(), BTreeSet::new());
        state.groups.insert(group.id.clone(), group);
        id
    }

    /// Add members directly, without recording calls.
    pub async fn seed_members<I, S>(
        &self,
        group_id: &ResourceId,
        members: I,
    ) -> ValidationResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let members = MemberSet::try_from_strs(members)?;
        let mut state = self.state.write().await;
        let entry = state.members.entry(group_id.to_string()).or_default();
        entry.extend(members);
        Ok(())
    }

    /// Remove a group directly, as if someone deleted it outside the provider.
    pub async fn remove_group_out_of_band(&self, group_id: &ResourceId) {
        let mut state = self.state.write().await;
        state.groups.remove(group_id.as_str());
        state.members.remove(group_id.as_str());
    }

    /// Current members of a group, read without recording a call.
    pub async fn members_of(&self, group_id: &ResourceId) -> MemberSet {
        let state = self.state.read().await;
        state
            .members
            .get(group_id.as_str())
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Current group object, read without recording a call.
    pub async fn group(&self, group_id: &ResourceId) -> Option<Group> {
        let state = self.state.read().await;
        state.groups.get(group_id.as_str()).cloned()
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<RemoteCall> {
        self.state.read().await.calls.clone()
    }

    /// Forget recorded calls while keeping org contents.
    pub async fn clear_calls(&self) {
        self.state.write().await.calls.clear();
    }

    pub async fn stats(&self) -> InMemoryStats {
        let state = self.state.read().await;
        InMemoryStats {
            group_count: state.groups.len(),
            membership_count: state.members.values().map(BTreeSet::len).sum(),
            call_count: state.calls.len(),
        }
    }

    fn new_group(profile: GroupProfile) -> Group {
        let now = Utc::now();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Group {
            id: format!("00g{}", &suffix[..17]),
            created: Some(now),
            last_updated: Some(now),
            last_membership_updated: Some(now),
            object_class: vec!["okta:user_group".to_string()],
            group_type: Some(GroupType::OktaGroup),
            profile,
            links: None,
        }
    }
}

impl Default for InMemoryGroupsApi {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupsApi for InMemoryGroupsApi {
    async fn create_group(&self, profile: &GroupProfile) -> ProviderResult<Group> {
        let mut state = self.state.write().await;
        state.calls.push(RemoteCall::CreateGroup {
            name: profile.name.clone(),
        });

        let group = Self::new_group(profile.clone());
        debug!("In-memory org created group '{}' ({})", profile.name, group.id);
        state.members.insert(group.id.clone(), BTreeSet::new());
        state.groups.insert(group.id.clone(), group.clone());
        Ok(group)
    }

    async fn get_group(&self, group_id: &ResourceId) -> ProviderResult<Option<Group>> {
        let mut state = self.state.write().await;
        state.calls.push(RemoteCall::GetGroup {
            group_id: group_id.to_string(),
        });
        Ok(state.groups.get(group_id.as_str()).cloned())
    }

    async fn update_group(
        &self,
        group_id: &ResourceId,
        profile: &GroupProfile,
    ) -> ProviderResult<Group> {
        let mut state = self.state.write().await;
        state.calls.push(RemoteCall::UpdateGroup {
            group_id: group_id.to_string(),
            name: profile.name.clone(),
        });

        let group = state
            .groups
            .get_mut(group_id.as_str())
            .ok_or_else(|| ProviderError::not_found("Group", group_id.as_str()))?;
        group.profile = profile.clone();
        group.last_updated = Some(Utc::now());
        Ok(group.clone())
    }

    async fn delete_group(&self, group_id: &ResourceId) -> ProviderResult<()> {
        let mut state = self.state.write().await;
        state.calls.push(RemoteCall::DeleteGroup {
            group_id: group_id.to_string(),
        });

        if state.groups.remove(group_id.as_str()).is_none() {
            return Err(ProviderError::not_found("Group", group_id.as_str()));
        }
        state.members.remove(group_id.as_str());
        Ok(())
    }

    async fn list_group_users(
        &self,
        group_id: &ResourceId,
        after: Option<&str>,
    ) -> ProviderResult<MemberPage> {
        let mut state = self.state.write().await;
        state.calls.push(RemoteCall::ListMembers {
            group_id: group_id.to_string(),
            after: after.map(str::to_string),
        });

        let members = state
            .members
            .get(group_id.as_str())
            .ok_or_else(|| ProviderError::not_found("Group", group_id.as_str()))?;

        // Members are kept sorted, so the cursor is simply "strictly greater than".
        let page: Vec<ResourceId> = members
            .iter()
            .filter(|id| after.is_none_or(|cursor| id.as_str() > cursor))
            .take(self.page_size + 1)
            .cloned()
            .collect();

        let has_more = page.len() > self.page_size;
        let page: Vec<ResourceId> = page.into_iter().take(self.page_size).collect();
        let next = if has_more {
            page.last().map(|id| id.to_string())
        } else {
            None
        };
        trace!(
            "In-memory page for group {}: {} members, next {:?}",
            group_id,
            page.len(),
            next
        );

        Ok(MemberPage {
            members: page,
            next,
        })
    }

    async fn add_user_to_group(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> ProviderResult<()> {
        let mut state = self.state.write().await;
        state.calls.push(RemoteCall::AddMember {
            group_id: group_id.to_string(),
            member_id: user_id.to_string(),
        });

        let members = state
            .members
            .get_mut(group_id.as_str())
            .ok_or_else(|| ProviderError::not_found("Group", group_id.as_str()))?;
        if !members.insert(user_id.clone()) {
            return Err(ProviderError::AlreadyMember {
                group_id: group_id.clone(),
                member_id: user_id.clone(),
            });
        }
        Ok(())
    }

    async fn remove_user_from_group(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> ProviderResult<()> {
        let mut state = self.state.write().await;
        state.calls.push(RemoteCall::RemoveMember {
            group_id: group_id.to_string(),
            member_id: user_id.to_string(),
        });

        let members = state
            .members
            .get_mut(group_id.as_str())
            .ok_or_else(|| ProviderError::not_found("Group", group_id.as_str()))?;
        if !members.remove(user_id) {
            return Err(ProviderError::NotMember {
                group_id: group_id.clone(),
                member_id: user_id.clone(),
            });
        }
        Ok(())
    }
}
