use std::time::Duration;

use chrono::{DateTime, Utc};
use redlens_core::{RedditCredentials, RedditError};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::api::TokenResponse;

const REDDIT_API_BASE: &str = "https://oauth.reddit.com";
const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An authenticated Reddit connection for a single fetch.
///
/// Opening a session performs the application-only token grant. Dropping it
/// tears down the connection pool on every exit path; application-only tokens
/// are not revocable individually and simply age out.
pub struct RedditSession {
    http_client: Client,
    user_agent: String,
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl RedditSession {
    pub async fn open(credentials: &RedditCredentials) -> Result<Self, RedditError> {
        let http_client = Client::builder()
            .user_agent(&credentials.user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        debug!("Requesting application-only token");
        let response = http_client
            .post(REDDIT_TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(RedditError::RateLimitExceeded {
                retry_after: retry_after_seconds(&response),
            });
        }
        if !status.is_success() {
            error!("Token request failed with status {}", status);
            return Err(RedditError::AuthenticationFailed {
                reason: format!("token endpoint returned status {}", status.as_u16()),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            error!("Failed to parse token response: {}", e);
            RedditError::InvalidResponse {
                details: "Failed to parse token response".to_string(),
            }
        })?;

        let expires_at = Utc::now() + chrono::Duration::seconds(token.expires_in as i64);
        info!("Opened Reddit session, token expires at {}", expires_at);

        Ok(Self {
            http_client,
            user_agent: credentials.user_agent.clone(),
            access_token: token.access_token,
            expires_at,
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Issues a GET and surfaces transport failures only. Callers that need
    /// to interpret specific statuses run before `classify_status`.
    pub(crate) async fn send_get(
        &self,
        endpoint: &str,
        query_params: Option<&[(&str, &str)]>,
    ) -> Result<Response, RedditError> {
        if self.is_expired() {
            warn!("Reddit access token expired at {}", self.expires_at);
        }

        let url = format!("{}{}", REDDIT_API_BASE, endpoint);
        let mut request_builder = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header("User-Agent", &self.user_agent);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }

        debug!("Making Reddit API request: GET {}", endpoint);
        request_builder.send().await.map_err(map_transport_error)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query_params: Option<&[(&str, &str)]>,
    ) -> Result<T, RedditError> {
        let response = self.send_get(endpoint, query_params).await?;
        if let Some(err) = classify_status(&response, endpoint) {
            return Err(err);
        }
        response.json().await.map_err(|e| {
            error!("Failed to parse response for {}: {}", endpoint, e);
            RedditError::InvalidResponse {
                details: format!("failed to parse response for {}", endpoint),
            }
        })
    }
}

impl Drop for RedditSession {
    fn drop(&mut self) {
        debug!("Released Reddit session");
    }
}

/// Maps a non-success status to its error. `None` means the response is usable.
pub(crate) fn classify_status(response: &Response, endpoint: &str) -> Option<RedditError> {
    let status = response.status();
    if status.is_success() {
        return None;
    }

    error!("Request failed with status {} for {}", status, endpoint);
    let err = match status.as_u16() {
        429 => RedditError::RateLimitExceeded {
            retry_after: retry_after_seconds(response),
        },
        401 => RedditError::InvalidToken,
        403 => RedditError::Forbidden {
            resource: endpoint.to_string(),
        },
        404 => RedditError::InvalidResponse {
            details: format!("resource not found: {}", endpoint),
        },
        code if status.is_server_error() => RedditError::ServerError { status_code: code },
        code => RedditError::InvalidResponse {
            details: format!("unexpected status {}", code),
        },
    };
    Some(err)
}

fn retry_after_seconds(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(60)
}

fn map_transport_error(err: reqwest::Error) -> RedditError {
    if err.is_timeout() {
        RedditError::RequestTimeout
    } else {
        RedditError::Network {
            details: err.to_string(),
        }
    }
}
