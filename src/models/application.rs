//! Application payloads for the three-field SWA (secure web authentication) template.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Okta app template name for three-field SWA applications.
pub const SWA_THREE_FIELD_APP_NAME: &str = "template_swa3field";

/// Sign-on mode used by SWA applications.
pub const BROWSER_PLUGIN_SIGN_ON_MODE: &str = "BROWSER_PLUGIN";

/// Common behaviour of concrete application payloads.
pub trait ApplicationInstance {
    /// Okta template name (`name` on the wire).
    fn app_name(&self) -> &str;

    /// Sign-on mode (`signOnMode` on the wire).
    fn sign_on_mode(&self) -> &str;
}

/// A browser-plugin SWA application that fills a username, a password and
/// one extra field on the target login page.
///
/// ```rust
/// use okta_provider::models::{ApplicationInstance, SwaThreeFieldApplication};
///
/// let app = SwaThreeFieldApplication::default();
/// assert_eq!(app.app_name(), "template_swa3field");
/// assert_eq!(app.sign_on_mode(), "BROWSER_PLUGIN");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwaThreeFieldApplication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<SchemeApplicationCredentials>,
    #[serde(rename = "_embedded", skip_serializing_if = "Option::is_none")]
    pub embedded: Option<Value>,
    #[serde(rename = "_links", skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<ApplicationAccessibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub licensing: Option<ApplicationLicensing>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<SwaThreeFieldApplicationSettings>,
    pub sign_on_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<ApplicationVisibility>,
}

impl Default for SwaThreeFieldApplication {
    fn default() -> Self {
        Self {
            credentials: None,
            embedded: None,
            links: None,
            accessibility: None,
            created: None,
            features: Vec::new(),
            id: None,
            label: None,
            last_updated: None,
            licensing: None,
            name: SWA_THREE_FIELD_APP_NAME.to_string(),
            profile: None,
            settings: None,
            sign_on_mode: BROWSER_PLUGIN_SIGN_ON_MODE.to_string(),
            status: None,
            visibility: None,
        }
    }
}

impl SwaThreeFieldApplication {
    /// New application with the template name and sign-on mode preset.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApplicationInstance for SwaThreeFieldApplication {
    fn app_name(&self) -> &str {
        &self.name
    }

    fn sign_on_mode(&self) -> &str {
        &self.sign_on_mode
    }
}

/// Credentials block shared by scheme-based applications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemeApplicationCredentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<PasswordCredential>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal_password: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing: Option<ApplicationCredentialsSigning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name_template: Option<ApplicationCredentialsUsernameTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCredential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationCredentialsSigning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_rotated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_rotation: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_mode: Option<String>,
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationCredentialsUsernameTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationAccessibility {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_service: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationLicensing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationVisibility {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub app_links: BTreeMap<String, bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_launch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_submit_toolbar: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide: Option<ApplicationVisibilityHide>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationVisibilityHide {
    #[serde(rename = "iOS", skip_serializing_if = "Option::is_none")]
    pub ios: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwaThreeFieldApplicationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<SwaThreeFieldApplicationSettingsApplication>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit_assignment: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_hook_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<ApplicationSettingsNotifications>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Value>,
}

/// Selectors and target for the three fields the browser plugin fills in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwaThreeFieldApplicationSettingsApplication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_field_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_field_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_url_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_selector: Option<String>,
    #[serde(rename = "targetURL", skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name_selector: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettingsNotifications {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpn: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_application_serializes_only_template_fields() {
        let app = SwaThreeFieldApplication::new();
        assert_eq!(
            serde_json::to_value(&app).unwrap(),
            json!({"name": "template_swa3field", "signOnMode": "BROWSER_PLUGIN"})
        );
    }

    #[test]
    fn test_parse_full_application() {
        let app: SwaThreeFieldApplication = serde_json::from_value(json!({
            "id": "0oa1gjh63g214q0Hq0g4",
            "name": "template_swa3field",
            "label": "Intranet",
            "status": "ACTIVE",
            "signOnMode": "BROWSER_PLUGIN",
            "created": "2021-04-26T18:03:17.000Z",
            "accessibility": {"selfService": false},
            "visibility": {
                "autoSubmitToolbar": false,
                "hide": {"iOS": false, "web": true},
                "appLinks": {"login": true}
            },
            "credentials": {
                "scheme": "EDIT_USERNAME_AND_PASSWORD",
                "userNameTemplate": {"template": "${source.login}", "type": "BUILT_IN"},
                "revealPassword": false
            },
            "settings": {
                "app": {
                    "targetURL": "https://intranet.example.com/login",
                    "buttonSelector": "#btn-login",
                    "userNameSelector": "#username",
                    "passwordSelector": "#password",
                    "extraFieldSelector": "#tenant",
                    "extraFieldValue": "acme"
                }
            },
            "_links": {"self": {"href": "https://example.okta.com/api/v1/apps/0oa1gjh63g214q0Hq0g4"}}
        }))
        .unwrap();

        assert_eq!(app.label.as_deref(), Some("Intranet"));
        let visibility = app.visibility.unwrap();
        assert_eq!(visibility.hide.unwrap().web, Some(true));
        assert_eq!(visibility.app_links.get("login"), Some(&true));

        let settings = app.settings.unwrap().app.unwrap();
        assert_eq!(
            settings.target_url.as_deref(),
            Some("https://intranet.example.com/login")
        );
        assert_eq!(settings.user_name_selector.as_deref(), Some("#username"));
        assert_eq!(settings.extra_field_value.as_deref(), Some("acme"));

        let credentials = app.credentials.unwrap();
        assert_eq!(
            credentials.user_name_template.unwrap().template_type.as_deref(),
            Some("BUILT_IN")
        );
    }

    #[test]
    fn test_missing_template_fields_fall_back_to_defaults() {
        let app: SwaThreeFieldApplication =
            serde_json::from_value(json!({"label": "Bare"})).unwrap();
        assert_eq!(app.app_name(), SWA_THREE_FIELD_APP_NAME);
        assert_eq!(app.sign_on_mode(), BROWSER_PLUGIN_SIGN_ON_MODE);
    }
}
