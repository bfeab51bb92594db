//! Token refresh over HTTP.

use async_trait::async_trait;
use chrono::Duration;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::AccessToken;
use super::AuthFlow;
use crate::error::AuthError;

/// Refreshes a session by posting its refresh token to an endpoint.
///
/// Sends `grant_type=refresh_token&refresh_token=...` as a form and expects
/// `{ "access_token", "expires_in"?, "refresh_token"? }` back. A response
/// without a new refresh token keeps the old one.
#[derive(Debug, Clone)]
pub struct RefreshEndpointFlow {
    http_client: Client,
    url: Url,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(alias = "error_description", alias = "error")]
    detail: String,
}

impl RefreshEndpointFlow {
    pub fn new(url: &str) -> Result<Self, AuthError> {
        Ok(Self {
            http_client: Client::new(),
            url: Url::parse(url).map_err(|e| AuthError::Parse(format!("refresh url: {e}")))?,
        })
    }

    /// Uses a caller-supplied HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }
}

#[async_trait]
impl AuthFlow for RefreshEndpointFlow {
    async fn refresh(&self, current: &AccessToken) -> Result<AccessToken, AuthError> {
        let Some(refresh_token) = current.refresh_token.as_deref() else {
            return Err(AuthError::RefreshFailed {
                message: "no refresh token".into(),
            });
        };

        let response = self
            .http_client
            .post(self.url.clone())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.detail)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            return Err(AuthError::RefreshFailed { message });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::Parse(e.to_string()))?;
        let expires_at = token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));

        Ok(AccessToken {
            access_token: token.access_token,
            expires_at,
            refresh_token: token.refresh_token.or_else(|| Some(refresh_token.to_string())),
        })
    }
}
