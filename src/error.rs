//! Error types for the Okta group resource.
//!
//! Errors fall into a small taxonomy that callers can act on:
//!
//! - **not-found**: a group vanished remotely. During a read this is absorbed
//!   and turned into a "remove from state" signal, so it only surfaces from
//!   import.
//! - **remote rejection**: Okta refused a request ([`ProviderError::Api`]).
//! - **partial failure**: a membership add/remove sequence stopped at its first
//!   failing member ([`ProviderError::Membership`]).
//! - **malformed input**: an unparseable import ID or an invalid configuration.
//! - **cancellation**: the caller's cancellation token fired mid-operation.

use crate::value_objects::ResourceId;
use std::fmt;

/// Main error type for group resource and membership operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Configuration or identifier values that failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Client configuration errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The remote resource does not exist
    #[error("{resource_type} with ID {id} not found")]
    NotFound { resource_type: String, id: String },

    /// Okta rejected the request
    #[error("Okta API error ({status}) while trying to {operation}: {summary}")]
    Api {
        operation: String,
        status: u16,
        error_code: Option<String>,
        summary: String,
        causes: Vec<String>,
    },

    /// The user already belongs to the group
    #[error("User {member_id} is already a member of group {group_id}")]
    AlreadyMember {
        group_id: ResourceId,
        member_id: ResourceId,
    },

    /// The user does not belong to the group
    #[error("User {member_id} is not a member of group {group_id}")]
    NotMember {
        group_id: ResourceId,
        member_id: ResourceId,
    },

    /// A membership change sequence stopped at its first failing member
    #[error("Failed to {operation} user {member_id} in group {group_id}: {source}")]
    Membership {
        operation: MemberOperation,
        group_id: ResourceId,
        member_id: ResourceId,
        #[source]
        source: Box<ProviderError>,
    },

    /// The group exists but its membership could not be brought up to date
    #[error("Failed to update group users on group {during} (group {group_id}): {source}")]
    MembershipUpdate {
        group_id: ResourceId,
        during: ResourceOperation,
        #[source]
        source: Box<ProviderError>,
    },

    /// The group was created but could not be read back
    #[error("Group {group_id} was created but could not be read back: {source}")]
    Created {
        group_id: ResourceId,
        #[source]
        source: Box<ProviderError>,
    },

    /// Import identifier could not be parsed
    #[error(
        "Invalid import ID '{input}': {reason}. Format must be 'group_id' or 'group_id/skip_users'"
    )]
    InvalidImportId { input: String, reason: String },

    /// The caller cancelled the operation before it completed
    #[error("Operation cancelled before it could {operation}")]
    Cancelled { operation: String },

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unexpected internal condition
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Validation errors for identifiers and resource configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Identifier is empty
    #[error("ID cannot be empty")]
    EmptyId,

    /// Identifier contains characters Okta never issues
    #[error("Invalid ID format: '{id}'")]
    InvalidIdFormat { id: String },

    /// Configuration is not a JSON object
    #[error("Configuration for '{resource_type}' must be an object")]
    ExpectedObject { resource_type: String },

    /// Required attribute is missing
    #[error("Required attribute '{attribute}' is missing")]
    MissingRequiredAttribute { attribute: String },

    /// Attribute value doesn't match the declared type
    #[error("Attribute '{attribute}' has invalid type, expected {expected}, got {actual}")]
    InvalidAttributeType {
        attribute: String,
        expected: String,
        actual: String,
    },

    /// Attribute is not declared by the resource schema
    #[error("Unknown attribute '{attribute}' for resource '{resource_type}'")]
    UnknownAttribute {
        attribute: String,
        resource_type: String,
    },

    /// Required string attribute is present but empty
    #[error("Attribute '{attribute}' cannot be empty")]
    EmptyAttribute { attribute: String },
}

/// Errors raised while building a client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// API token was not provided
    #[error("API token is required but not provided")]
    MissingApiToken,

    /// Neither an org name nor an explicit endpoint was provided
    #[error("Either an org name or an explicit endpoint is required")]
    MissingEndpoint,

    /// Endpoint could not be parsed as a URL
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Page limit outside of what Okta accepts
    #[error("Page limit {limit} is out of range (1..={max})")]
    InvalidPageLimit { limit: u32, max: u32 },

    /// Environment variable holds an unusable value
    #[error("Environment variable {name} has an invalid value: {reason}")]
    InvalidEnvironment { name: String, reason: String },

    /// Underlying HTTP client could not be constructed
    #[error("Failed to build HTTP client: {message}")]
    HttpClient { message: String },
}

/// Direction of a single membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberOperation {
    Add,
    Remove,
}

impl fmt::Display for MemberOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberOperation::Add => write!(f, "add"),
            MemberOperation::Remove => write!(f, "remove"),
        }
    }
}

/// Resource lifecycle step during which membership was reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOperation {
    Create,
    Update,
}

impl fmt::Display for ResourceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceOperation::Create => write!(f, "create"),
            ResourceOperation::Update => write!(f, "update"),
        }
    }
}

// Convenience methods for creating common errors
impl ProviderError {
    /// Create a resource not found error
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a cancellation error for the named operation
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create an import ID error
    pub fn invalid_import_id(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidImportId {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a failed membership change with the member that caused it
    pub fn membership(
        operation: MemberOperation,
        group_id: &ResourceId,
        member_id: &ResourceId,
        source: ProviderError,
    ) -> Self {
        Self::Membership {
            operation,
            group_id: group_id.clone(),
            member_id: member_id.clone(),
            source: Box::new(source),
        }
    }

    /// Whether the error means the remote resource does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Api { status, .. } => *status == 404,
            _ => false,
        }
    }

    /// Whether the error was caused by cancellation, at any nesting depth.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled { .. } => true,
            Self::Membership { source, .. }
            | Self::MembershipUpdate { source, .. }
            | Self::Created { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// ID of a group that exists remotely even though its creation failed.
    ///
    /// The host should persist this ID so the group is not orphaned.
    pub fn created_group_id(&self) -> Option<&ResourceId> {
        match self {
            Self::Created { group_id, .. } => Some(group_id),
            Self::MembershipUpdate {
                group_id,
                during: ResourceOperation::Create,
                ..
            } => Some(group_id),
            _ => None,
        }
    }

    /// Whether the remote reported that the user is already a group member.
    pub fn is_already_member(&self) -> bool {
        match self {
            Self::AlreadyMember { .. } => true,
            Self::Api { status, .. } => *status == 409,
            _ => false,
        }
    }

    /// Whether the remote reported that the user is not a group member.
    pub fn is_not_member(&self) -> bool {
        matches!(self, Self::NotMember { .. }) || self.is_not_found()
    }
}

impl ValidationError {
    /// Create a missing required attribute error
    pub fn missing_required(attribute: impl Into<String>) -> Self {
        Self::MissingRequiredAttribute {
            attribute: attribute.into(),
        }
    }

    /// Create an invalid type error
    pub fn invalid_type(
        attribute: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::InvalidAttributeType {
            attribute: attribute.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

// Result type aliases for convenience
pub type ProviderResult<T> = Result<T, ProviderError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> ResourceId {
        ResourceId::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_error_creation() {
        let error = ProviderError::not_found("Group", "00g123");
        assert!(error.to_string().contains("Group"));
        assert!(error.to_string().contains("00g123"));
        assert!(error.is_not_found());
    }

    #[test]
    fn test_membership_error_names_member_and_operation() {
        let error = ProviderError::membership(
            MemberOperation::Add,
            &id("00g1"),
            &id("u2"),
            ProviderError::internal("boom"),
        );
        let message = error.to_string();
        assert!(message.contains("add"));
        assert!(message.contains("u2"));
        assert!(message.contains("00g1"));
        assert!(!error.is_cancelled());
    }

    #[test]
    fn test_cancellation_is_visible_through_wrappers() {
        let error = ProviderError::MembershipUpdate {
            group_id: id("00g1"),
            during: ResourceOperation::Create,
            source: Box::new(ProviderError::membership(
                MemberOperation::Remove,
                &id("00g1"),
                &id("u3"),
                ProviderError::cancelled("remove user u3"),
            )),
        };
        assert!(error.is_cancelled());
        assert!(!ProviderError::internal("x").is_cancelled());
    }

    #[test]
    fn test_created_group_id_survives_failed_creation() {
        let created = ProviderError::Created {
            group_id: id("00g1"),
            source: Box::new(ProviderError::cancelled("read group 00g1")),
        };
        assert_eq!(created.created_group_id(), Some(&id("00g1")));
        assert!(created.is_cancelled());
        assert!(created.to_string().contains("00g1"));

        let during_update = ProviderError::MembershipUpdate {
            group_id: id("00g2"),
            during: ResourceOperation::Update,
            source: Box::new(ProviderError::internal("boom")),
        };
        assert_eq!(during_update.created_group_id(), None);
        assert_eq!(ProviderError::internal("x").created_group_id(), None);
    }

    #[test]
    fn test_duplicate_predicates() {
        let conflict = ProviderError::Api {
            operation: "add user".into(),
            status: 409,
            error_code: None,
            summary: "conflict".into(),
            causes: vec![],
        };
        assert!(conflict.is_already_member());
        assert!(!conflict.is_not_member());

        let gone = ProviderError::not_found("User", "u1");
        assert!(gone.is_not_member());
        assert!(!gone.is_already_member());
    }

    #[test]
    fn test_validation_error_chain() {
        let error = ProviderError::from(ValidationError::missing_required("name"));
        assert!(error.to_string().contains("Validation error"));
        assert!(error.to_string().contains("name"));
    }
}
