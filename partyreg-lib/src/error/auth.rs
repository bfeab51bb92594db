//! Authentication error types

/// Errors that can occur while obtaining or refreshing a session token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Nobody is signed in.
    #[error("No active session")]
    NoSession,

    /// The identity provider refused to refresh the token.
    #[error("Token refresh failed: {message}")]
    RefreshFailed { message: String },

    /// Refresh failed and the session was signed out.
    #[error("Session expired")]
    SessionExpired,

    /// Network error during authentication.
    #[error("Network error during auth: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to parse authentication response.
    #[error("Auth response parse error: {0}")]
    Parse(String),
}
