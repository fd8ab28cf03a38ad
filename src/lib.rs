//! Okta group resource with declarative membership reconciliation.
//!
//! Manages Okta groups from a declarative configuration: the group's profile
//! and, optionally, the exact set of users that should belong to it. On every
//! apply the current membership is read from Okta, compared with the desired
//! set, and only the difference is written back.
//!
//! # Core Components
//!
//! - [`GroupResource`] - create, read, update, delete and import of groups
//! - [`MembershipReconciler`] - diff, apply and sync of group membership
//! - [`GroupsApi`] - the remote client seam, implemented by [`OktaClient`] and
//!   [`InMemoryGroupsApi`]
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use okta_provider::{ClientConfig, GroupConfig, GroupResource, OktaClient};
//! use okta_provider::value_objects::MemberSet;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OktaClient::new(ClientConfig::from_env()?)?;
//! let resource = GroupResource::new(client);
//!
//! let config = GroupConfig::new("Engineering")
//!     .with_users(MemberSet::try_from_strs(["00u1abcd", "00u2efgh"])?);
//! let state = resource.create(&config, &CancellationToken::new()).await?;
//! println!("created {}", state.id);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod membership;
pub mod models;
pub mod resource;
pub mod value_objects;

// Re-export commonly used types for convenience
pub use client::{GroupsApi, InMemoryGroupsApi, MemberPage, OktaClient};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ConfigError, ProviderError, ProviderResult, ValidationError};
pub use membership::{ApplyReport, MembershipDiff, MembershipReconciler, ReconcileOutcome, diff};
pub use resource::{GroupConfig, GroupResource, GroupState, ImportId, group_schema};
pub use value_objects::{MemberSet, ResourceId};
