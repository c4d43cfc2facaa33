//! REST client for the ShapeShift catalog API.
//!
//! # Architecture
//!
//! - JSON over `reqwest`; every response body goes through
//!   [`crate::normalize`] because envelope shapes differ per endpoint
//! - The bearer token lives in the key-value store under
//!   [`keys::AUTH_TOKEN`](crate::storage::keys::AUTH_TOKEN) and is re-read
//!   on every request, so a login from another process is picked up
//! - Product and category listings are cached with `moka` (5 minute TTL);
//!   any successful mutation invalidates the whole cache
//!
//! # Example
//!
//! ```rust,ignore
//! use shapeshift_storefront::api::{ApiClient, ApiConfig, ProductQuery};
//!
//! let client = ApiClient::new(&ApiConfig::new(base_url), store)?;
//! let products = client.list_products(&ProductQuery::default()).await?;
//! ```

mod auth;
mod cache;
mod categories;
mod products;
mod uploads;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::storage::{KeyValueStore, keys};

pub use auth::LoginResponse;
pub use products::ProductQuery;
pub use uploads::{UploadFile, UploadedImage};

use cache::CacheValue;

/// Default API base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5023/api/v1";

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response did not contain the expected record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation needs a login and no token is stored.
    #[error("Not logged in")]
    MissingToken,

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of a [`ApiError::Status`] error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected our credentials (401 or 403).
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// Upstream API settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL including the version prefix, e.g. `http://localhost:5023/api/v1`.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Settings for `base_url` with a 30 second timeout.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the catalog REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    store: Arc<dyn KeyValueStore>,
    cache: Cache<String, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client. The token is read from `store` on each request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_owned(),
                store,
                cache,
            }),
        })
    }

    /// The stored bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.inner
            .store
            .get(keys::AUTH_TOKEN)
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from)
    }

    /// Store or clear the bearer token.
    ///
    /// Storage failures are logged; the token then only lives until the
    /// next read.
    pub fn set_token(&self, token: Option<&SecretString>) {
        let result = match token {
            Some(token) => self
                .inner
                .store
                .set(keys::AUTH_TOKEN, token.expose_secret()),
            None => self.inner.store.remove(keys::AUTH_TOKEN),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist auth token");
        }
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        Ok(Url::parse(&url)?)
    }

    /// Start a request, attaching the bearer token when `auth` is set and a
    /// token is stored.
    fn request(&self, method: Method, url: Url, auth: bool) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match self.token() {
            Some(token) if auth => builder.bearer_auth(token.expose_secret()),
            _ => builder,
        }
    }

    /// Send a request and return the JSON body.
    ///
    /// Non-success statuses become [`ApiError::Status`] carrying the server's
    /// `message` when it sent one. An empty success body is `null`.
    async fn send(builder: RequestBuilder) -> Result<Value, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &body);
            tracing::warn!(status = %status, message = %message, "Catalog API returned an error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Drop every cached listing so the next read goes to the server.
    pub async fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

/// Error text for a failed response: the body's `message`, a generic
/// message when the body is not JSON, or the status code.
fn error_message(status: StatusCode, body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return "Request failed".to_owned();
    };
    json.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map_or_else(
            || format!("HTTP error! status: {}", status.as_u16()),
            str::to_owned,
        )
}
