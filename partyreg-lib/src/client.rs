//! Main PartyRegClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::Method;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::AccessToken;
use crate::auth::TokenProvider;
use crate::error::ApiError;
use crate::error::Error;

/// Client for the party registry REST API.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across threads safely.
///
/// # Example
///
/// ```
/// use partyreg_lib::PartyRegClient;
/// use partyreg_lib::auth::StaticTokenProvider;
///
/// let client = PartyRegClient::builder()
///     .url("http://localhost:8000/api")
///     .token_provider(StaticTokenProvider::new("my-token"))
///     .build()
///     .unwrap();
/// assert_eq!(client.base_url().path(), "/api");
/// ```
#[derive(Clone)]
pub struct PartyRegClient {
    inner: Arc<PartyRegClientInner>,
}

struct PartyRegClientInner {
    base_url: Url,
    token_provider: Arc<dyn TokenProvider>,
    http_client: Client,
    timeout: Option<Duration>,
}

impl PartyRegClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> PartyRegClientBuilder<Missing, Missing> {
        PartyRegClientBuilder::new()
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Builds `<base>/<segments...>?<query>`.
    ///
    /// Segments are percent-encoded individually, so ids and place ids can
    /// be passed as-is.
    pub(crate) fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.inner.base_url.to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn execute(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&serde_json::Value>,
        token: &AccessToken,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self
            .inner
            .http_client
            .request(method.clone(), url.clone())
            .bearer_auth(&token.access_token);

        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        Ok(request.send().await?)
    }

    /// Sends an authenticated request.
    ///
    /// A 401 triggers one token refresh and one replay. A second 401, or a
    /// failed refresh, is returned to the caller.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, Error> {
        log::debug!("{method} {url}");
        let provider = &self.inner.token_provider;

        let token = provider.get_token().await?;
        let mut response = self.execute(&method, &url, body.as_ref(), &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            log::debug!("401 from {url}, refreshing session");
            let token = provider.refresh(&token).await?;
            response = self.execute(&method, &url, body.as_ref(), &token).await?;
        }

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            log::warn!("{method} {url} failed with {status}");
            Err(Error::Api(ApiError::from_body(status.as_u16(), &body)))
        }
    }

    /// GET and decode JSON.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let response = self.send(Method::GET, url, None).await?;
        decode(response).await
    }

    /// Sends a JSON body and decodes the JSON reply.
    pub(crate) async fn send_json<T, B>(&self, method: Method, url: Url, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let response = self.send(method, url, Some(body)).await?;
        decode(response).await
    }
}

/// Reads the body and decodes it, keeping the raw text on failure.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    let body = response.text().await.map_err(ApiError::from)?;
    serde_json::from_str(&body)
        .map_err(|e| Error::Api(ApiError::parse_with_body(e.to_string(), body)))
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`PartyRegClient`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `url` - The API base URL, e.g. `https://parties.example.edu/api`
/// - `token_provider` - A [`TokenProvider`] implementation
pub struct PartyRegClientBuilder<U, P> {
    url: U,
    token_provider: P,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl PartyRegClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            token_provider: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }
}

impl Default for PartyRegClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> PartyRegClientBuilder<Missing, P> {
    /// Sets the API base URL.
    pub fn url(self, url: impl Into<String>) -> PartyRegClientBuilder<Set<String>, P> {
        PartyRegClientBuilder {
            url: Set(url.into()),
            token_provider: self.token_provider,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U> PartyRegClientBuilder<U, Missing> {
    /// Sets the token provider for authentication.
    pub fn token_provider<T: TokenProvider + 'static>(
        self,
        provider: T,
    ) -> PartyRegClientBuilder<U, Set<Arc<dyn TokenProvider>>> {
        self.shared_token_provider(Arc::new(provider))
    }

    /// Sets a token provider that the caller keeps a handle to, e.g. to
    /// sign the session out.
    pub fn shared_token_provider(
        self,
        provider: Arc<dyn TokenProvider>,
    ) -> PartyRegClientBuilder<U, Set<Arc<dyn TokenProvider>>> {
        PartyRegClientBuilder {
            url: self.url,
            token_provider: Set(provider),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U, P> PartyRegClientBuilder<U, P> {
    /// Sets the request timeout. No timeout by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl PartyRegClientBuilder<Set<String>, Set<Arc<dyn TokenProvider>>> {
    /// Builds the [`PartyRegClient`].
    ///
    /// Fails if the URL does not parse or cannot carry a path.
    pub fn build(self) -> Result<PartyRegClient, Error> {
        let raw = self.url.0;
        let base_url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(raw).into());
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(ApiError::from)?
            }
        };

        Ok(PartyRegClient {
            inner: Arc::new(PartyRegClientInner {
                base_url,
                token_provider: self.token_provider.0,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;

    fn client(url: &str) -> PartyRegClient {
        PartyRegClient::builder()
            .url(url)
            .token_provider(StaticTokenProvider::new("t"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("http://localhost:8000/api/");
        let url = c.endpoint(&["parties", "42"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/parties/42");
    }

    #[test]
    fn test_endpoint_encodes_query_and_segments() {
        let c = client("http://localhost:8000");
        let url = c
            .endpoint(
                &["locations", "autocomplete"],
                &[("input", "12 Rosemary St & Co".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/locations/autocomplete?input=12+Rosemary+St+%26+Co"
        );

        let url = c.endpoint(&["locations", "place-details", "a/b"], &[]).unwrap();
        assert_eq!(url.path(), "/locations/place-details/a%2Fb");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = PartyRegClient::builder()
            .url("not a url")
            .token_provider(StaticTokenProvider::new("t"))
            .build();
        assert!(matches!(result, Err(Error::Api(ApiError::InvalidUrl(_)))));

        let result = PartyRegClient::builder()
            .url("mailto:someone@example.edu")
            .token_provider(StaticTokenProvider::new("t"))
            .build();
        assert!(result.is_err());
    }
}
