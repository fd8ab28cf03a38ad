//! ResourceId value object for Okta object identifiers.
//!
//! Okta identifies groups, users and applications with opaque strings such as
//! `00g1emaKYZTWRYYRRTSK`. The provider never interprets them, but it does rely
//! on them being usable as URL path segments and as the first half of a
//! `group_id/skip_users` import identifier.

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated Okta object identifier.
///
/// ## Validation Rules
///
/// - Must not be empty
/// - Must not contain `/` (it would split an import ID or a URL path)
/// - Must not contain whitespace or control characters
///
/// ## Examples
///
/// ```rust
/// use okta_provider::value_objects::ResourceId;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let id = ResourceId::new("00g1emaKYZTWRYYRRTSK".to_string())?;
///     println!("Group ID: {}", id.as_str());
///
///     assert!(ResourceId::new("".to_string()).is_err());
///     assert!(ResourceId::new("00g1/skip_users".to_string()).is_err());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    /// Create a new ResourceId with validation.
    ///
    /// Use this when the value comes from configuration, an import ID, or any
    /// other untrusted input.
    pub fn new(value: String) -> ValidationResult<Self> {
        Self::validate_format(&value)?;
        Ok(Self(value))
    }

    /// Create a ResourceId without validation.
    ///
    /// Only for identifiers this crate generated itself or already holds in
    /// validated form.
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    /// Get the string representation of the ResourceId.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate_format(value: &str) -> ValidationResult<()> {
        if value.is_empty() {
            return Err(ValidationError::EmptyId);
        }

        if value
            .chars()
            .any(|c| c == '/' || c.is_whitespace() || c.is_control())
        {
            return Err(ValidationError::InvalidIdFormat {
                id: value.to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ResourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

/// Convert from String to ResourceId with validation.
impl TryFrom<String> for ResourceId {
    type Error = ValidationError;

    fn try_from(value: String) -> ValidationResult<Self> {
        Self::new(value)
    }
}

/// Convert from &str to ResourceId with validation.
impl TryFrom<&str> for ResourceId {
    type Error = ValidationError;

    fn try_from(value: &str) -> ValidationResult<Self> {
        Self::new(value.to_string())
    }
}
