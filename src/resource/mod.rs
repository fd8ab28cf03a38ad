//! The `okta_group` resource: typed configuration, schema, import IDs and the
//! lifecycle controller that ties them to a [`GroupsApi`](crate::client::GroupsApi).

pub mod group;
pub mod import;
pub mod schema;

pub use group::{GroupConfig, GroupResource, GroupState};
pub use import::ImportId;
pub use schema::{AttributeKind, AttributeSchema, ResourceSchema, group_schema};
