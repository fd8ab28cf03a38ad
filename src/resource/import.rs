//! Import identifiers for existing groups.
//!
//! An import ID is either a bare group ID or a group ID followed by
//! `/skip_users`, which imports the group without reading its members.

use crate::error::ProviderError;
use crate::value_objects::ResourceId;
use std::fmt;
use std::str::FromStr;

const SKIP_USERS_SUFFIX: &str = "skip_users";

/// A parsed import identifier.
///
/// ```rust
/// use okta_provider::resource::ImportId;
///
/// let plain: ImportId = "00g123".parse().unwrap();
/// assert!(!plain.skip_users);
///
/// let skipping: ImportId = "00g123/skip_users".parse().unwrap();
/// assert_eq!(skipping.group_id.as_str(), "00g123");
/// assert!(skipping.skip_users);
/// assert_eq!(skipping.to_string(), "00g123/skip_users");
///
/// assert!("00g123/wrong".parse::<ImportId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportId {
    pub group_id: ResourceId,
    pub skip_users: bool,
}

impl ImportId {
    pub fn new(group_id: ResourceId, skip_users: bool) -> Self {
        Self {
            group_id,
            skip_users,
        }
    }
}

impl FromStr for ImportId {
    type Err = ProviderError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = input.split('/').collect();
        let (raw_id, skip_users) = match parts.as_slice() {
            [id] => (*id, false),
            [id, suffix] if *suffix == SKIP_USERS_SUFFIX => (*id, true),
            [_, suffix] => {
                return Err(ProviderError::invalid_import_id(
                    input,
                    format!("unknown suffix '{}'", suffix),
                ));
            }
            _ => {
                return Err(ProviderError::invalid_import_id(
                    input,
                    "too many '/'-separated parts",
                ));
            }
        };

        if raw_id.is_empty() {
            return Err(ProviderError::invalid_import_id(input, "group ID is empty"));
        }
        let group_id = ResourceId::new(raw_id.to_string())
            .map_err(|e| ProviderError::invalid_import_id(input, e.to_string()))?;

        Ok(Self {
            group_id,
            skip_users,
        })
    }
}

impl fmt::Display for ImportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skip_users {
            write!(f, "{}/{}", self.group_id, SKIP_USERS_SUFFIX)
        } else {
            write!(f, "{}", self.group_id)
        }
    }
}
