//! Error types

mod api;
mod auth;

pub use api::*;
pub use auth::*;

/// Top-level error returned by client and service calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A payload could not be serialized or a body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The call makes no sense in the current state (e.g. a missing id).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Message suitable for showing in a table or form.
    ///
    /// Prefers the server's `detail` text; everything else collapses to a
    /// generic message so transport internals never reach the UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::Http {
                detail: Some(detail),
                ..
            }) => detail.clone(),
            Self::Api(ApiError::Http { status: 404, .. }) => {
                "The requested record no longer exists.".to_string()
            }
            Self::Auth(AuthError::SessionExpired | AuthError::NoSession) => {
                "Your session has expired. Please sign in again.".to_string()
            }
            Self::Api(ApiError::Network(_)) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// HTTP status if the server answered with an error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(e) => e.status_code(),
            _ => None,
        }
    }
}
