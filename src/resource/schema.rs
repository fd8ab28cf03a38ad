//! Attribute declarations for the `okta_group` resource.
//!
//! The schema is what a host shows users and what raw configuration is checked
//! against before it becomes a typed [`GroupConfig`](crate::resource::GroupConfig).

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resource type name as registered with the host.
pub const GROUP_RESOURCE_TYPE: &str = "okta_group";

/// Shown whenever a configuration manages membership through `users`.
pub const USERS_DEPRECATION: &str = "The `users` field is now deprecated for the resource \
     `okta_group`, please replace all uses of this with: `okta_group_memberships`";

/// Data type of a resource attribute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AttributeKind {
    String,
    Bool,
    /// Unordered set of strings
    StringSet,
}

impl AttributeKind {
    fn describe(self) -> &'static str {
        match self {
            AttributeKind::String => "string",
            AttributeKind::Bool => "bool",
            AttributeKind::StringSet => "set of strings",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            AttributeKind::String => value.is_string(),
            AttributeKind::Bool => value.is_boolean(),
            AttributeKind::StringSet => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}

/// Declaration of one attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Message shown when the attribute is used, if it is deprecated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,
}

impl AttributeSchema {
    fn new(name: &str, kind: AttributeKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: false,
            default: None,
            deprecation: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    fn deprecated(mut self, message: &str) -> Self {
        self.deprecation = Some(message.to_string());
        self
    }
}

/// Attribute declarations for one resource type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: Vec<AttributeSchema>,
}

impl ResourceSchema {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Check raw configuration against the declared attributes.
    ///
    /// `null` counts as absent. Unknown attributes are rejected.
    pub fn validate(&self, config: &Value) -> ValidationResult<()> {
        let obj = config
            .as_object()
            .ok_or_else(|| ValidationError::ExpectedObject {
                resource_type: self.resource_type.clone(),
            })?;

        for attr in &self.attributes {
            match obj.get(&attr.name).filter(|value| !value.is_null()) {
                None if attr.required => {
                    return Err(ValidationError::missing_required(&attr.name));
                }
                None => {}
                Some(value) if !attr.kind.accepts(value) => {
                    return Err(ValidationError::invalid_type(
                        &attr.name,
                        attr.kind.describe(),
                        value_type(value),
                    ));
                }
                Some(_) => {}
            }
        }

        if let Some(unknown) = obj.keys().find(|key| self.attribute(key).is_none()) {
            return Err(ValidationError::UnknownAttribute {
                attribute: unknown.clone(),
                resource_type: self.resource_type.clone(),
            });
        }

        Ok(())
    }
}

/// The `okta_group` resource schema.
pub fn group_schema() -> ResourceSchema {
    ResourceSchema {
        resource_type: GROUP_RESOURCE_TYPE.to_string(),
        attributes: vec![
            AttributeSchema::new("name", AttributeKind::String, "Name of the Okta Group.")
                .required(),
            AttributeSchema::new(
                "description",
                AttributeKind::String,
                "Description of the Okta Group.",
            ),
            AttributeSchema::new(
                "users",
                AttributeKind::StringSet,
                "Users associated with the group.",
            )
            .deprecated(USERS_DEPRECATION),
            AttributeSchema::new(
                "skip_users",
                AttributeKind::Bool,
                "Ignore users sync. This is a temporary solution until 'users' field is supported in all the app-group resources",
            )
            .with_default(Value::Bool(false)),
        ],
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
