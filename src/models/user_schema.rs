//! User schema attribute payloads (`/api/v1/meta/schemas/user/default`).
//!
//! `maxLength` and `minLength` are `Option<i64>`: Okta treats an absent bound
//! and an explicit `0` differently, so the two must survive a round trip.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single attribute definition in the Okta user profile schema.
///
/// ```rust
/// use okta_provider::models::UserSchemaAttribute;
///
/// let attribute: UserSchemaAttribute =
///     serde_json::from_str(r#"{"title": "Nickname", "type": "string", "minLength": 0}"#).unwrap();
/// assert_eq!(attribute.min_length, Some(0));
/// assert_eq!(attribute.max_length, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSchemaAttribute {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<UserSchemaAttributeItems>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master: Option<UserSchemaAttributeMaster>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutability: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<UserSchemaAttributeEnum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<UserSchemaAttributePermission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub union: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<String>,
}

impl UserSchemaAttribute {
    /// Returns the length bounds as a `(min, max)` pair, if both are set and consistent.
    pub fn length_bounds(&self) -> Option<(i64, i64)> {
        match (self.min_length, self.max_length) {
            (Some(min), Some(max)) if min <= max => Some((min, max)),
            _ => None,
        }
    }
}

/// Element definition for array-typed attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSchemaAttributeItems {
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<UserSchemaAttributeEnum>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
}

/// Which profile source is authoritative for the attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSchemaAttributeMaster {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub priority: Vec<UserSchemaAttributeMasterPriority>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub master_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSchemaAttributeMasterPriority {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub priority_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// One labelled choice in a `oneOf` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSchemaAttributeEnum {
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub constant: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSchemaAttributePermission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
}
