//! Session token management with single-flight refresh.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::sync::RwLock;
use tokio::sync::watch;

use super::AccessToken;
use super::TokenProvider;
use crate::error::AuthError;

/// An identity provider that can exchange a session for a new token.
#[async_trait]
pub trait AuthFlow: Send + Sync {
    /// Refreshes `current`, typically with its refresh token.
    async fn refresh(&self, current: &AccessToken) -> Result<AccessToken, AuthError>;
}

/// A token provider holding the signed-in session.
///
/// Refreshes are single-flight: when several requests are rejected at once,
/// the first caller performs the refresh and the others wait for it and
/// reuse its token. A failed refresh signs the session out.
///
/// # Example
///
/// ```ignore
/// let flow = RefreshEndpointFlow::new("https://api.example.edu/auth/refresh")?;
/// let session = SessionTokenProvider::new(flow);
/// session.sign_in(AccessToken::with_refresh(access, None, refresh)).await;
///
/// let client = PartyRegClient::builder()
///     .url("https://api.example.edu/api")
///     .token_provider(session)
///     .build()?;
/// ```
pub struct SessionTokenProvider<F> {
    flow: F,
    token: RwLock<Option<AccessToken>>,
    refresh_lock: Mutex<()>,
    signed_in: watch::Sender<bool>,
}

impl<F: AuthFlow> SessionTokenProvider<F> {
    /// Creates a provider with nobody signed in.
    pub fn new(flow: F) -> Self {
        let (signed_in, _) = watch::channel(false);
        Self {
            flow,
            token: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            signed_in,
        }
    }

    /// Starts a session with an initial token.
    pub async fn sign_in(&self, token: AccessToken) {
        *self.token.write().await = Some(token);
        self.signed_in.send_replace(true);
    }

    /// Ends the session. Subsequent requests fail with `NoSession`.
    pub async fn sign_out(&self) {
        *self.token.write().await = None;
        self.signed_in.send_replace(false);
        log::info!("session signed out");
    }

    pub async fn is_signed_in(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Receiver that observes sign-in and sign-out.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.signed_in.subscribe()
    }
}

#[async_trait]
impl<F: AuthFlow> TokenProvider for SessionTokenProvider<F> {
    async fn get_token(&self) -> Result<AccessToken, AuthError> {
        let token = self
            .token
            .read()
            .await
            .clone()
            .ok_or(AuthError::NoSession)?;

        if token.is_expired() && token.can_refresh() {
            return self.refresh(&token).await;
        }
        Ok(token)
    }

    async fn refresh(&self, rejected: &AccessToken) -> Result<AccessToken, AuthError> {
        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited.
        let current = match self.token.read().await.clone() {
            None => return Err(AuthError::SessionExpired),
            Some(t) if t.access_token != rejected.access_token => return Ok(t),
            Some(t) => t,
        };

        match self.flow.refresh(&current).await {
            Ok(token) => {
                log::debug!("session token refreshed");
                *self.token.write().await = Some(token.clone());
                Ok(token)
            }
            Err(e) => {
                log::warn!("token refresh failed: {e}");
                self.sign_out().await;
                Err(AuthError::SessionExpired)
            }
        }
    }
}
