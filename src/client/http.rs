//! HTTP implementation of [`GroupsApi`] against the Okta management API.
//!
//! Requests are authenticated with an `SSWS` API token. Error responses are
//! decoded from Okta's error body into [`ProviderError::Api`], except for the
//! statuses the group resource gives a meaning to:
//!
//! | Call | Status | Result |
//! |------|--------|--------|
//! | `get_group` | 404 | `Ok(None)` |
//! | `update_group`, `delete_group`, `list_group_users` | 404 | [`ProviderError::NotFound`] |
//! | `add_user_to_group` | 409 | [`ProviderError::AlreadyMember`] |
//! | `remove_user_from_group` | 404 | [`ProviderError::NotMember`] |

use crate::client::{GroupsApi, MemberPage};
use crate::config::ClientConfig;
use crate::error::{ConfigError, ProviderError, ProviderResult};
use crate::models::{Group, GroupProfile, User};
use crate::value_objects::ResourceId;
use log::{debug, trace};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, LINK};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

/// Okta's error response body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OktaErrorBody {
    error_code: Option<String>,
    error_summary: Option<String>,
    error_id: Option<String>,
    error_causes: Vec<OktaErrorCause>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OktaErrorCause {
    error_summary: String,
}

#[derive(Serialize)]
struct GroupPayload<'a> {
    profile: &'a GroupProfile,
}

/// Okta Groups API client.
#[derive(Debug, Clone)]
pub struct OktaClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl OktaClient {
    /// Create a client for the configured org.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> ProviderResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| ConfigError::HttpClient {
                message: e.to_string(),
            })?;

        debug!("Okta client configured for {}", config.endpoint());
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn api_url(&self, segments: &[&str]) -> ProviderResult<Url> {
        let mut url = self.config.endpoint().clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ProviderError::internal("Okta endpoint cannot carry a path"))?;
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        trace!("{} {}", method, url);
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("SSWS {}", self.config.api_token()))
            .header(ACCEPT, "application/json")
    }
}

impl GroupsApi for OktaClient {
    async fn create_group(&self, profile: &GroupProfile) -> ProviderResult<Group> {
        let url = self.api_url(&["groups"])?;
        let response = self
            .request(Method::POST, url)
            .json(&GroupPayload { profile })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(format!("create group '{}'", profile.name), response).await);
        }
        let group: Group = response.json().await?;
        debug!("Created Okta group '{}' ({})", group.profile.name, group.id);
        Ok(group)
    }

    async fn get_group(&self, group_id: &ResourceId) -> ProviderResult<Option<Group>> {
        let url = self.api_url(&["groups", group_id.as_str()])?;
        let response = self.request(Method::GET, url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("Okta group {} not found", group_id);
                Ok(None)
            }
            status if status.is_success() => Ok(Some(response.json().await?)),
            _ => Err(api_error(format!("read group {}", group_id), response).await),
        }
    }

    async fn update_group(
        &self,
        group_id: &ResourceId,
        profile: &GroupProfile,
    ) -> ProviderResult<Group> {
        let url = self.api_url(&["groups", group_id.as_str()])?;
        let response = self
            .request(Method::PUT, url)
            .json(&GroupPayload { profile })
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ProviderError::not_found("Group", group_id.as_str())),
            status if status.is_success() => Ok(response.json().await?),
            _ => Err(api_error(format!("update group {}", group_id), response).await),
        }
    }

    async fn delete_group(&self, group_id: &ResourceId) -> ProviderResult<()> {
        let url = self.api_url(&["groups", group_id.as_str()])?;
        let response = self.request(Method::DELETE, url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ProviderError::not_found("Group", group_id.as_str())),
            status if status.is_success() => Ok(()),
            _ => Err(api_error(format!("delete group {}", group_id), response).await),
        }
    }

    async fn list_group_users(
        &self,
        group_id: &ResourceId,
        after: Option<&str>,
    ) -> ProviderResult<MemberPage> {
        let mut url = self.api_url(&["groups", group_id.as_str(), "users"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &self.config.page_limit().to_string());
            if let Some(cursor) = after {
                query.append_pair("after", cursor);
            }
        }

        let response = self.request(Method::GET, url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(ProviderError::not_found("Group", group_id.as_str()));
            }
            status if !status.is_success() => {
                return Err(
                    api_error(format!("list members of group {}", group_id), response).await,
                );
            }
            _ => {}
        }

        let next = next_cursor(response.headers());
        let users: Vec<User> = response.json().await?;
        let members = users
            .into_iter()
            .map(|user| ResourceId::new(user.id))
            .collect::<Result<Vec<_>, _>>()?;

        trace!(
            "Fetched {} members of group {}, next cursor {:?}",
            members.len(),
            group_id,
            next
        );
        Ok(MemberPage { members, next })
    }

    async fn add_user_to_group(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> ProviderResult<()> {
        let url = self.api_url(&["groups", group_id.as_str(), "users", user_id.as_str()])?;
        let response = self.request(Method::PUT, url).send().await?;

        match response.status() {
            StatusCode::CONFLICT => Err(ProviderError::AlreadyMember {
                group_id: group_id.clone(),
                member_id: user_id.clone(),
            }),
            status if status.is_success() => Ok(()),
            _ => Err(api_error(
                format!("add user {} to group {}", user_id, group_id),
                response,
            )
            .await),
        }
    }

    async fn remove_user_from_group(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> ProviderResult<()> {
        let url = self.api_url(&["groups", group_id.as_str(), "users", user_id.as_str()])?;
        let response = self.request(Method::DELETE, url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ProviderError::NotMember {
                group_id: group_id.clone(),
                member_id: user_id.clone(),
            }),
            status if status.is_success() => Ok(()),
            _ => Err(api_error(
                format!("remove user {} from group {}", user_id, group_id),
                response,
            )
            .await),
        }
    }
}

/// Turn a non-success response into [`ProviderError::Api`].
///
/// Bodies that are not Okta error documents still produce an error, with the
/// HTTP reason phrase as summary.
async fn api_error(operation: String, response: Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: OktaErrorBody = serde_json::from_str(&body).unwrap_or_default();

    let summary = parsed
        .error_summary
        .filter(|summary| !summary.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        });
    debug!(
        "Okta rejected '{}' with {} (errorCode {:?}, errorId {:?})",
        operation, status, parsed.error_code, parsed.error_id
    );

    ProviderError::Api {
        operation,
        status: status.as_u16(),
        error_code: parsed.error_code,
        summary,
        causes: parsed
            .error_causes
            .into_iter()
            .map(|cause| cause.error_summary)
            .filter(|summary| !summary.is_empty())
            .collect(),
    }
}

/// Extract the `after` cursor from a `Link: <...>; rel="next"` header.
pub(crate) fn next_cursor(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|link| {
            let mut parts = link.split(';').map(str::trim);
            let target = parts.next()?.strip_prefix('<')?.strip_suffix('>')?;
            let is_next = parts.any(|param| {
                param
                    .strip_prefix("rel=")
                    .map(|rel| rel.trim_matches('"') == "next")
                    .unwrap_or(false)
            });
            if !is_next {
                return None;
            }
            Url::parse(target)
                .ok()?
                .query_pairs()
                .find(|(key, _)| key == "after")
                .map(|(_, value)| value.into_owned())
        })
}
