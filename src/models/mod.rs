//! Typed Okta API payloads.
//!
//! These mirror the JSON shapes returned by the Okta management API. Optional
//! fields are `Option` and are omitted when absent, so a round trip never
//! turns "unset" into a zero or empty value.

mod application;
mod group;
mod user;
mod user_schema;

pub use application::{
    ApplicationAccessibility, ApplicationCredentialsSigning,
    ApplicationCredentialsUsernameTemplate, ApplicationInstance, ApplicationLicensing,
    ApplicationSettingsNotifications, ApplicationVisibility, ApplicationVisibilityHide,
    BROWSER_PLUGIN_SIGN_ON_MODE, PasswordCredential, SWA_THREE_FIELD_APP_NAME,
    SchemeApplicationCredentials, SwaThreeFieldApplication, SwaThreeFieldApplicationSettings,
    SwaThreeFieldApplicationSettingsApplication,
};
pub use group::{Group, GroupProfile, GroupType};
pub use user::{User, UserProfile};
pub use user_schema::{
    UserSchemaAttribute, UserSchemaAttributeEnum, UserSchemaAttributeItems,
    UserSchemaAttributeMaster, UserSchemaAttributeMasterPriority, UserSchemaAttributePermission,
};
