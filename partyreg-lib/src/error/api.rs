//! API error types

use serde::Deserialize;

/// Errors that can occur during API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP error response from the API.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body, or the detail text when one was sent.
        message: String,
        /// Server-supplied `detail`, if the body carried one.
        detail: Option<String>,
    },

    /// Network error during API call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse API response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

/// Error body sent by the backend.
///
/// `detail` is a string for handled errors and a list of field problems
/// for request validation failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: DetailValue,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DetailValue {
    Text(String),
    Fields(Vec<FieldDetail>),
}

#[derive(Debug, Deserialize)]
struct FieldDetail {
    msg: String,
}

impl ApiError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            detail: None,
        }
    }

    /// Builds an HTTP error from a response body, extracting `detail`.
    pub fn from_body(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| match b.detail {
                DetailValue::Text(text) => text,
                DetailValue::Fields(fields) => fields
                    .into_iter()
                    .map(|f| f.msg)
                    .collect::<Vec<_>>()
                    .join("; "),
            })
            .filter(|d| !d.is_empty());

        Self::Http {
            status,
            message: detail.clone().unwrap_or_else(|| body.to_string()),
            detail,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the server detail message if available.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
