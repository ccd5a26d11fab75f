//! HTTP client adapter for the external auth API. Every request goes through
//! one place so the bearer credential is attached consistently and every
//! failure comes back as an [`ApiError`] with the status and body preserved.
//!
//! Requests are single attempt: no retry, no backoff. The only time bound is
//! the client timeout from [`ApiConfig`]. Token material is never logged.

use crate::{
    error::{ApiError, TransportKind},
    token::TokenStore,
    APP_USER_AGENT,
};
use reqwest::{header::AUTHORIZATION, Client, Method, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};
use tracing::{debug, info_span, Instrument};
use url::Url;

/// Default request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of characters kept from a non-JSON error body.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: APP_USER_AGENT.to_string(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Status and parsed body of a successful (2xx) response.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON, `Value::Null` for an empty body.
    pub body: Value,
}

impl ApiResponse {
    /// Decodes the body into `T`.
    ///
    /// # Errors
    /// Returns a decode transport error when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.body.clone()).map_err(|err| ApiError::Transport {
            kind: TransportKind::Decode,
            message: format!("Failed to decode response: {err}"),
        })
    }
}

pub struct ApiClient {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
    default_token: RwLock<Option<SecretString>>,
}

impl ApiClient {
    /// Builds a client that reads the bearer credential from `tokens`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Unknown(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.base_url,
            tokens,
            default_token: RwLock::new(None),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Store the bearer credential is read from on every request.
    #[must_use]
    pub fn tokens(&self) -> Arc<dyn TokenStore> {
        self.tokens.clone()
    }

    /// Credential used for the rest of this client's life when the store is
    /// empty. `None` removes it.
    pub fn set_default_token(&self, token: Option<SecretString>) {
        *self
            .default_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    #[must_use]
    pub fn default_token(&self) -> Option<SecretString> {
        self.default_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Token attached to the next request: the stored one first, then the
    /// session default.
    #[must_use]
    pub fn current_token(&self) -> Option<SecretString> {
        self.tokens.read().or_else(|| self.default_token())
    }

    /// # Errors
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(Method::GET, path, None).await
    }

    /// # Errors
    /// Returns [`ApiError`] on encoding or transport failure or a non-success status.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::POST, path, Some(encode(body)?)).await
    }

    /// # Errors
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn post_empty(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(Method::POST, path, None).await
    }

    /// # Errors
    /// Returns [`ApiError`] on encoding or transport failure or a non-success status.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::PUT, path, Some(encode(body)?)).await
    }

    /// # Errors
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(Method::DELETE, path, None).await
    }

    /// Sends one request with the current credential attached, if any.
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        let token = self.current_token();
        self.send_with_token(method, path, body, token.as_ref())
            .await
    }

    /// Sends one request with an explicit credential instead of the stored one.
    pub(crate) async fn send_with_token(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&SecretString>,
    ) -> Result<ApiResponse, ApiError> {
        let url = build_url_with_base(self.base_url.as_str(), path);

        let mut builder = self.http.request(method.clone(), &url);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let span = info_span!(
            "api.request",
            http.method = %method,
            url = %url,
            authenticated = token.is_some()
        );
        let response = builder
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        debug!("{} {} -> {}", method, url, response.status());

        handle_response(response).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"***")
            .finish_non_exhaustive()
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|err| ApiError::Unknown(format!("Failed to encode request: {err}")))
}

/// Joins base and path with exactly one `/` and no trailing slash added.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim().trim_start_matches('/');

    if base.is_empty() {
        format!("/{path}")
    } else if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

/// Maps reqwest failures into transport errors with timeout detection.
fn map_request_error(err: reqwest::Error) -> ApiError {
    let (kind, message) = if err.is_timeout() {
        (
            TransportKind::Timeout,
            "Request timed out. Please try again.".to_string(),
        )
    } else if err.is_connect() {
        (
            TransportKind::Connect,
            format!("Unable to reach the server: {err}"),
        )
    } else if err.is_decode() || err.is_body() {
        (
            TransportKind::Decode,
            format!("Failed to read response: {err}"),
        )
    } else {
        (TransportKind::Other, format!("Request failed: {err}"))
    };

    ApiError::Transport { kind, message }
}

/// Parses success bodies and turns every other status into a rejection.
async fn handle_response(response: Response) -> Result<ApiResponse, ApiError> {
    let status = response.status();
    let text = response.text().await.map_err(map_request_error)?;

    if status.is_success() {
        let body = parse_body(&text).map_err(|err| ApiError::Transport {
            kind: TransportKind::Decode,
            message: format!("Failed to decode response: {err}"),
        })?;
        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    } else {
        let body = parse_body(&text).unwrap_or_else(|_| Value::String(sanitize_body(&text)));
        Err(ApiError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

fn parse_body(text: &str) -> Result<Value, serde_json::Error> {
    if text.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(text)
    }
}

/// Trims and truncates plain-text error bodies before they reach the UI.
fn sanitize_body(body: &str) -> String {
    body.trim().chars().take(MAX_ERROR_CHARS).collect()
}
