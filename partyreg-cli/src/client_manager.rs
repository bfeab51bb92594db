//! Builds the API client and session from settings.

use std::sync::Arc;
use std::time::Duration;

use partyreg_lib::PartyRegClient;
use partyreg_lib::auth::AccessToken;
use partyreg_lib::auth::RefreshEndpointFlow;
use partyreg_lib::auth::SessionTokenProvider;
use partyreg_lib::auth::StaticTokenProvider;
use partyreg_lib::auth::TokenProvider;
use thiserror::Error;

use crate::settings::Settings;
use crate::settings::TOKEN_VAR;

#[derive(Debug, Error)]
pub enum ClientManagerError {
    #[error("not signed in: set {TOKEN_VAR} or add a token to settings.json")]
    NoToken,

    #[error("authentication error: {0}")]
    Auth(#[from] partyreg_lib::error::AuthError),

    #[error("API error: {0}")]
    Api(#[from] partyreg_lib::error::Error),
}

/// The session behind the client.
#[derive(Clone)]
pub enum Session {
    /// A fixed token; a 401 ends the session.
    Static,
    /// A renewable session; a 401 refreshes once through the token endpoint.
    Renewable(Arc<SessionTokenProvider<RefreshEndpointFlow>>),
}

/// Owns the API client for the process.
#[derive(Clone)]
pub struct ClientManager {
    client: PartyRegClient,
    session: Session,
}

impl ClientManager {
    /// Creates the client described by `settings`.
    ///
    /// With both a refresh token and a refresh URL configured the session
    /// renews itself; otherwise the token is used as-is.
    pub async fn connect(settings: &Settings) -> Result<Self, ClientManagerError> {
        let token = settings.token.clone().ok_or(ClientManagerError::NoToken)?;

        let (provider, session): (Arc<dyn TokenProvider>, Session) =
            match (&settings.refresh_token, &settings.refresh_url) {
                (Some(refresh_token), Some(refresh_url)) => {
                    let flow = RefreshEndpointFlow::new(refresh_url)?;
                    let session = Arc::new(SessionTokenProvider::new(flow));
                    session
                        .sign_in(AccessToken::with_refresh(token, None, refresh_token.clone()))
                        .await;
                    let provider: Arc<dyn TokenProvider> = session.clone();
                    (provider, Session::Renewable(session))
                }
                _ => {
                    let provider: Arc<dyn TokenProvider> = Arc::new(StaticTokenProvider::new(token));
                    (provider, Session::Static)
                }
            };

        let mut builder = PartyRegClient::builder()
            .url(settings.api_url.clone())
            .shared_token_provider(provider);
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        log::info!("connected to {}", client.base_url());

        Ok(Self { client, session })
    }

    pub fn client(&self) -> &PartyRegClient {
        &self.client
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Drops the session's token. Later requests fail with no session.
    pub async fn sign_out(&self) {
        match &self.session {
            Session::Renewable(session) => session.sign_out().await,
            Session::Static => log::debug!("static token, nothing to sign out"),
        }
    }
}
