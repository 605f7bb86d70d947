//! Reqwest-backed identity provider adapter.
//!
//! This adapter owns transport details only: request construction, timeout
//! and HTTP status mapping, and JSON decoding of the provider's user object.
//! The load-bearing decision lives in [`classify_response`]: only an
//! explicit 404 becomes [`UserExistence::Absent`]; every other failure is an
//! error so callers can tell "confirmed gone" apart from "could not check".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use url::Url;

use super::dto::ProviderUserDto;
use crate::domain::ports::{IdentityProvider, IdentityProviderError, UserExistence};
use crate::domain::user::WorkosUserId;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_USER_AGENT: &str = "usersync-backend/0.1";

/// Identity provider adapter performing GET requests against the
/// user-management API.
pub struct WorkosHttpClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl WorkosHttpClient {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        base_url: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn user_url(&self, workos_id: &WorkosUserId) -> Result<Url, IdentityProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                IdentityProviderError::transport("provider base URL cannot carry a path")
            })?
            .pop_if_empty()
            .extend(["user_management", "users", workos_id.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl IdentityProvider for WorkosHttpClient {
    async fn fetch_user(
        &self,
        workos_id: &WorkosUserId,
    ) -> Result<UserExistence, IdentityProviderError> {
        let url = self.user_url(workos_id)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(self.api_key.as_str())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        classify_response(status, body.as_ref(), workos_id)
    }
}

/// Map an HTTP exchange onto the three-way existence answer.
fn classify_response(
    status: StatusCode,
    body: &[u8],
    workos_id: &WorkosUserId,
) -> Result<UserExistence, IdentityProviderError> {
    if status == StatusCode::NOT_FOUND {
        return Ok(UserExistence::Absent);
    }

    if !status.is_success() {
        let message = status_message(status, body);
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                IdentityProviderError::auth(message)
            }
            StatusCode::TOO_MANY_REQUESTS => IdentityProviderError::rate_limited(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                IdentityProviderError::timeout(message)
            }
            _ => IdentityProviderError::transport(message),
        });
    }

    let decoded: ProviderUserDto = serde_json::from_slice(body).map_err(|error| {
        IdentityProviderError::decode(format!("invalid provider user payload: {error}"))
    })?;
    if decoded.id != workos_id.as_str() {
        return Err(IdentityProviderError::decode(format!(
            "provider answered for user {} when asked about {workos_id}",
            decoded.id
        )));
    }

    Ok(UserExistence::Exists)
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    if error.is_timeout() {
        IdentityProviderError::timeout(error.to_string())
    } else {
        IdentityProviderError::transport(error.to_string())
    }
}

fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
