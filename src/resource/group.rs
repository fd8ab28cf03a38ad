//! Lifecycle controller for the `okta_group` resource.

use crate::client::{GroupsApi, cancellable};
use crate::error::{ProviderError, ProviderResult, ResourceOperation, ValidationError};
use crate::membership::{MembershipReconciler, ReconcileOutcome};
use crate::models::{Group, GroupProfile};
use crate::resource::import::ImportId;
use crate::resource::schema::{USERS_DEPRECATION, group_schema};
use crate::value_objects::{MemberSet, ResourceId};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Validated configuration of one group.
///
/// `users` is `None` when membership is not managed here at all, which is
/// different from `Some` of an empty set (the group should have no members).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<MemberSet>,
    #[serde(default)]
    pub skip_users: bool,
}

impl GroupConfig {
    /// Create a configuration with only a name set.
    ///
    /// Membership starts out unmanaged; use [`with_users`](Self::with_users)
    /// to manage it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use okta_provider::resource::GroupConfig;
    /// use okta_provider::value_objects::MemberSet;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = GroupConfig::new("Engineering")
    ///     .with_description("Builds things")
    ///     .with_users(MemberSet::try_from_strs(["00u1"])?);
    /// assert_eq!(config.description.as_deref(), Some("Builds things"));
    /// assert!(!config.skip_users);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            users: None,
            skip_users: false,
        }
    }

    /// Set the group description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Manage membership, making `users` the exact member list.
    pub fn with_users(mut self, users: MemberSet) -> Self {
        self.users = Some(users);
        self
    }

    /// Opt out of membership reads and writes.
    pub fn with_skip_users(mut self, skip_users: bool) -> Self {
        self.skip_users = skip_users;
        self
    }

    /// Build a configuration from raw attribute values.
    ///
    /// The value is checked against [`group_schema`], defaults are applied and
    /// every member ID is validated. An empty description is treated as unset.
    /// The name is kept verbatim so it matches what Okta stores, but a blank
    /// name is rejected.
    ///
    /// ```rust
    /// use okta_provider::resource::GroupConfig;
    /// use serde_json::json;
    ///
    /// let config = GroupConfig::from_value(&json!({
    ///     "name": "Engineering",
    ///     "users": ["00u2", "00u1"]
    /// })).unwrap();
    /// assert!(!config.skip_users);
    /// assert_eq!(config.users.unwrap().to_strings(), vec!["00u1", "00u2"]);
    ///
    /// assert!(GroupConfig::from_value(&json!({"description": "no name"})).is_err());
    /// ```
    pub fn from_value(value: &Value) -> ProviderResult<Self> {
        group_schema().validate(value)?;

        let field = |name: &str| value.get(name).filter(|v| !v.is_null());

        let name = field("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ValidationError::EmptyAttribute {
                attribute: "name".to_string(),
            })?
            .to_string();
        let description = field("description")
            .and_then(Value::as_str)
            .filter(|description| !description.is_empty())
            .map(str::to_string);
        let users = field("users")
            .and_then(Value::as_array)
            .map(|items| MemberSet::try_from_strs(items.iter().filter_map(Value::as_str)))
            .transpose()?;
        let skip_users = field("skip_users")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Self {
            name,
            description,
            users,
            skip_users,
        })
    }

    /// The Okta profile sent on create and update.
    pub fn profile(&self) -> GroupProfile {
        GroupProfile::new(self.name.clone(), self.description.clone())
    }
}

/// What the host persists for a group between operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupState {
    pub id: ResourceId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<MemberSet>,
    #[serde(default)]
    pub skip_users: bool,
}

impl GroupState {
    /// State as configured, before anything has been read back.
    pub fn from_config(id: ResourceId, config: &GroupConfig) -> Self {
        Self {
            id,
            name: config.name.clone(),
            description: config.description.clone(),
            users: config.users.clone(),
            skip_users: config.skip_users,
        }
    }

    /// Bare state for a group known only by its ID.
    pub fn placeholder(id: ResourceId, skip_users: bool) -> Self {
        Self {
            id,
            name: String::new(),
            description: None,
            users: None,
            skip_users,
        }
    }

    /// The configuration that would keep this state unchanged.
    pub fn to_config(&self) -> GroupConfig {
        GroupConfig {
            name: self.name.clone(),
            description: self.description.clone(),
            users: self.users.clone(),
            skip_users: self.skip_users,
        }
    }
}

/// Create, read, update, delete and import for Okta groups.
///
/// The controller owns no state between calls; the host hands in the previous
/// [`GroupState`] where one is needed.
///
/// # Example
///
/// ```rust
/// use okta_provider::client::InMemoryGroupsApi;
/// use okta_provider::resource::{GroupConfig, GroupResource};
/// use okta_provider::value_objects::MemberSet;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let resource = GroupResource::new(InMemoryGroupsApi::new());
/// let cancel = CancellationToken::new();
///
/// let config = GroupConfig::new("Engineering")
///     .with_users(MemberSet::try_from_strs(["00u1", "00u2"])?);
/// let state = resource.create(&config, &cancel).await?;
/// assert_eq!(state.users, config.users);
///
/// resource.delete(&state.id, &cancel).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GroupResource<C> {
    reconciler: MembershipReconciler<C>,
}

impl<C: GroupsApi> GroupResource<C> {
    /// Create a controller backed by `client`.
    pub fn new(client: C) -> Self {
        Self {
            reconciler: MembershipReconciler::new(client),
        }
    }

    /// The transport used for every remote call.
    pub fn client(&self) -> &C {
        self.reconciler.client()
    }

    /// Create the group, set its membership if managed, and read it back.
    ///
    /// If the group was created but its membership could not be set, the error
    /// is [`ProviderError::MembershipUpdate`], which carries the new group ID.
    /// A failed read-back returns [`ProviderError::Created`] for the same
    /// reason. Either way [`ProviderError::created_group_id`] yields the ID.
    pub async fn create(
        &self,
        config: &GroupConfig,
        cancel: &CancellationToken,
    ) -> ProviderResult<GroupState> {
        info!("Creating group '{}'", config.name);
        warn_if_users_managed(config);

        let profile = config.profile();
        let group = cancellable(
            cancel,
            || format!("create group '{}'", config.name),
            self.client().create_group(&profile),
        )
        .await?;
        let group_id = ResourceId::new(group.id.clone())?;
        debug!("Group '{}' created with ID {}", config.name, group_id);

        if let Some(users) = managed_users(config) {
            self.reconcile_members(&group_id, users, ResourceOperation::Create, cancel)
                .await?;
        }

        let expected = GroupState::from_config(group_id.clone(), config);
        let created = |source: ProviderError| ProviderError::Created {
            group_id: group_id.clone(),
            source: Box::new(source),
        };
        self.read(&group_id, &expected, cancel)
            .await
            .map_err(created)?
            .ok_or_else(|| created(ProviderError::not_found("Group", group_id.as_str())))
    }

    /// Refresh state from Okta.
    ///
    /// Returns `None` when the group no longer exists, so the host can drop it
    /// from state. Membership is re-read unless `prior.skip_users` is set, in
    /// which case `prior.users` is kept as is.
    pub async fn read(
        &self,
        group_id: &ResourceId,
        prior: &GroupState,
        cancel: &CancellationToken,
    ) -> ProviderResult<Option<GroupState>> {
        info!("Reading group {}", group_id);

        let fetched = cancellable(
            cancel,
            || format!("read group {}", group_id),
            self.client().get_group(group_id),
        )
        .await?;
        let Some(group) = fetched else {
            warn!("Group {} no longer exists, removing it from state", group_id);
            return Ok(None);
        };

        let users = if prior.skip_users {
            prior.users.clone()
        } else {
            match self
                .reconciler
                .sync(group_id, false, &MemberSet::new(), cancel)
                .await
            {
                Ok(observed) => Some(observed),
                Err(e) if e.is_not_found() => {
                    warn!("Group {} disappeared while reading members", group_id);
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        };

        Ok(Some(state_from_group(group_id, group, users, prior.skip_users)))
    }

    /// Update the profile and, when it changed, the membership of a group.
    ///
    /// Membership is reconciled only if `users` is managed, differs from
    /// `prior.users` and `skip_users` is not set.
    pub async fn update(
        &self,
        group_id: &ResourceId,
        prior: &GroupState,
        config: &GroupConfig,
        cancel: &CancellationToken,
    ) -> ProviderResult<GroupState> {
        info!("Updating group {} ('{}')", group_id, config.name);
        warn_if_users_managed(config);

        let profile = config.profile();
        cancellable(
            cancel,
            || format!("update group {}", group_id),
            self.client().update_group(group_id, &profile),
        )
        .await?;

        match managed_users(config) {
            Some(users) if prior.users.as_ref() != Some(users) => {
                self.reconcile_members(group_id, users, ResourceOperation::Update, cancel)
                    .await?;
            }
            Some(_) => debug!("Group {} membership unchanged", group_id),
            None => {}
        }

        let expected = GroupState::from_config(group_id.clone(), config);
        self.read(group_id, &expected, cancel)
            .await?
            .ok_or_else(|| ProviderError::not_found("Group", group_id.as_str()))
    }

    /// Delete a group. A group that is already gone counts as deleted.
    pub async fn delete(
        &self,
        group_id: &ResourceId,
        cancel: &CancellationToken,
    ) -> ProviderResult<()> {
        info!("Deleting group {}", group_id);

        let result = cancellable(
            cancel,
            || format!("delete group {}", group_id),
            self.client().delete_group(group_id),
        )
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                warn!("Group {} was already deleted", group_id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Import an existing group from `group_id` or `group_id/skip_users`.
    ///
    /// Unlike [`read`](Self::read), a missing group is an error here.
    pub async fn import_state(
        &self,
        raw: &str,
        cancel: &CancellationToken,
    ) -> ProviderResult<GroupState> {
        let import: ImportId = raw.parse()?;
        info!(
            "Importing group {} (skip_users: {})",
            import.group_id, import.skip_users
        );

        let prior = GroupState::placeholder(import.group_id.clone(), import.skip_users);
        self.read(&import.group_id, &prior, cancel)
            .await?
            .ok_or_else(|| ProviderError::not_found("Group", import.group_id.as_str()))
    }

    async fn reconcile_members(
        &self,
        group_id: &ResourceId,
        users: &MemberSet,
        during: ResourceOperation,
        cancel: &CancellationToken,
    ) -> ProviderResult<()> {
        let outcome = self
            .reconciler
            .reconcile(group_id, false, users, cancel)
            .await
            .map_err(|e| ProviderError::MembershipUpdate {
                group_id: group_id.clone(),
                during,
                source: Box::new(e),
            })?;

        if let ReconcileOutcome::Applied { report, .. } = outcome {
            info!(
                "Group {} membership updated: {} added, {} removed",
                group_id, report.added, report.removed
            );
        }
        Ok(())
    }
}

fn managed_users(config: &GroupConfig) -> Option<&MemberSet> {
    config.users.as_ref().filter(|_| !config.skip_users)
}

fn warn_if_users_managed(config: &GroupConfig) {
    if config.users.is_some() {
        warn!("{}", USERS_DEPRECATION);
    }
}

fn state_from_group(
    group_id: &ResourceId,
    group: Group,
    users: Option<MemberSet>,
    skip_users: bool,
) -> GroupState {
    GroupState {
        id: group_id.clone(),
        name: group.profile.name,
        description: group.profile.description.filter(|d| !d.is_empty()),
        users,
        skip_users,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{InMemoryGroupsApi, RemoteCall};
    use serde_json::json;

    fn set(ids: &[&str]) -> MemberSet {
        MemberSet::try_from_strs(ids).unwrap()
    }

    #[test]
    fn test_from_value_applies_defaults() {
        let config = GroupConfig::from_value(&json!({"name": "Ops", "description": ""})).unwrap();
        assert_eq!(config, GroupConfig::new("Ops"));
    }

    #[test]
    fn test_from_value_keeps_name_verbatim() {
        let config = GroupConfig::from_value(&json!({"name": " Ops team "})).unwrap();
        assert_eq!(config.name, " Ops team ");
        assert_eq!(config.profile().name, " Ops team ");
    }

    #[test]
    fn test_from_value_rejects_blank_name_and_bad_members() {
        let err = GroupConfig::from_value(&json!({"name": "  "})).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Validation(ValidationError::EmptyAttribute { .. })
        ));

        let err = GroupConfig::from_value(&json!({"name": "Ops", "users": ["a/b"]})).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Validation(ValidationError::InvalidIdFormat { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_without_users_touches_no_membership() {
        let api = InMemoryGroupsApi::new();
        let resource = GroupResource::new(&api);
        let cancel = CancellationToken::new();

        let state = resource
            .create(&GroupConfig::new("Ops").with_skip_users(true), &cancel)
            .await
            .unwrap();

        assert_eq!(state.name, "Ops");
        assert_eq!(state.users, None);
        assert!(!api.calls().await.iter().any(RemoteCall::touches_membership));
    }

    #[tokio::test]
    async fn test_update_skips_unchanged_membership() {
        let api = InMemoryGroupsApi::new();
        let group_id = api.seed_group("Ops", None).await;
        api.seed_members(&group_id, ["u1"]).await.unwrap();
        let resource = GroupResource::new(&api);
        let cancel = CancellationToken::new();

        let config = GroupConfig::new("Ops").with_users(set(&["u1"]));
        let prior = GroupState::from_config(group_id.clone(), &config);
        let renamed = GroupConfig {
            name: "Operations".to_string(),
            ..config
        };

        let state = resource
            .update(&group_id, &prior, &renamed, &cancel)
            .await
            .unwrap();

        assert_eq!(state.name, "Operations");
        assert!(!api.calls().await.iter().any(RemoteCall::is_write));
    }

    #[tokio::test]
    async fn test_read_missing_group_signals_removal() {
        let api = InMemoryGroupsApi::new();
        let resource = GroupResource::new(&api);
        let group_id = ResourceId::new("00gmissing".to_string()).unwrap();
        let prior = GroupState::placeholder(group_id.clone(), false);

        let state = resource
            .read(&group_id, &prior, &CancellationToken::new())
            .await
            .unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_group() {
        let api = InMemoryGroupsApi::new();
        let resource = GroupResource::new(&api);
        let group_id = ResourceId::new("00gmissing".to_string()).unwrap();

        resource
            .delete(&group_id, &CancellationToken::new())
            .await
            .unwrap();
    }
}
