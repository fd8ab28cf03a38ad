//! Value objects for Okta identifiers and membership sets.
//!
//! Each value object enforces its invariants at construction time, so code
//! past the configuration boundary never re-checks them.
//!
//! ## Usage Pattern
//!
//! ```rust
//! use okta_provider::value_objects::{MemberSet, ResourceId};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let id = ResourceId::new("00u1abcdEFGH2345ijk6".to_string())?;
//!     let members = MemberSet::from_iter([id]);
//!     assert_eq!(members.len(), 1);
//!     Ok(())
//! }
//! ```
mod member_set;
mod resource_id;

pub use member_set::MemberSet;
pub use resource_id::ResourceId;
