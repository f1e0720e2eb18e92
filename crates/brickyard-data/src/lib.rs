//! HTTP client utilities for Brickyard.
//!
//! A thin builder API over `reqwest` with a base URL, default headers and a
//! fetch policy: every attempt is bounded by a timeout (30 seconds by
//! default) and transient failures (timeouts, connection errors, 5xx) are
//! retried once. Client errors are returned as-is.
//!
//! # Example
//!
//! ```rust,no_run
//! use brickyard_data::{FetchClient, FetchError};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Envelope {
//!     order: serde_json::Value,
//! }
//!
//! # async fn run() -> Result<(), FetchError> {
//! let client = FetchClient::new()?
//!     .with_base_url("https://api.brickyard.example")
//!     .with_bearer_token("token");
//!
//! let created: Envelope = client
//!     .post("/orders/checkout")
//!     .header("Idempotency-Key", "chk-1")
//!     .json(&serde_json::json!({"paymentMethod": "cod"}))?
//!     .send()
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//! # let _ = created;
//! # Ok(())
//! # }
//! ```

mod error;
mod request;
mod response;
pub mod retry;
pub mod timeout;

use std::collections::HashMap;

use tracing::{debug, warn};

pub use error::FetchError;
pub use request::{Method, RequestBuilder};
pub use response::Response;
pub use retry::{BackoffStrategy, RetryCondition, RetryPolicy};
pub use timeout::TimeoutConfig;

/// Timeout and retry behavior applied to every request a client sends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchPolicy {
    pub timeout: TimeoutConfig,
    pub retry: RetryPolicy,
}

impl FetchPolicy {
    pub fn new(timeout: TimeoutConfig, retry: RetryPolicy) -> Self {
        Self { timeout, retry }
    }
}

/// HTTP client for making outbound requests.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
    policy: FetchPolicy,
}

impl FetchClient {
    /// Create a client with the default policy.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_policy(FetchPolicy::default())
    }

    /// Create a client with an explicit timeout and retry policy.
    pub fn with_policy(policy: FetchPolicy) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .connect_timeout(policy.timeout.connect)
            .user_agent(concat!("brickyard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::RequestError(e.to_string()))?;

        Ok(Self {
            http,
            base_url: None,
            default_headers: HashMap::new(),
            policy,
        })
    }

    /// Prepend a base URL to all relative request paths.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Send a bearer token with every request.
    pub fn with_bearer_token(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.with_default_header("Authorization", value)
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Get, url)
    }

    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Post, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    url.trim_start_matches('/')
                )
            }
            _ => url,
        };

        let builder = RequestBuilder::new(method, full_url).headers(
            self.default_headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        ClientRequestBuilder {
            client: self,
            builder,
        }
    }

    async fn execute(&self, request: &RequestBuilder) -> Result<Response, FetchError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", request.url, e)))?;
        let retry = &self.policy.retry;
        let mut attempt = 0u32;

        loop {
            debug!(
                method = request.method.as_str(),
                url = %url,
                attempt,
                "sending request"
            );

            match self.send_once(&url, request).await {
                Ok(response) => {
                    if retry.should_retry_status(response.status, attempt) {
                        warn!(
                            status = response.status,
                            url = %url,
                            attempt,
                            "server error, retrying"
                        );
                    } else {
                        debug!(status = response.status, url = %url, "response received");
                        return Ok(response);
                    }
                }
                Err(FetchError::Timeout(after)) if retry.should_retry_timeout(attempt) => {
                    warn!(url = %url, attempt, ?after, "request timed out, retrying");
                }
                Err(FetchError::Connection(reason)) if retry.should_retry_connection(attempt) => {
                    warn!(url = %url, attempt, %reason, "connection failed, retrying");
                }
                Err(e) => return Err(e),
            }

            let delay = retry.backoff.delay_for_attempt(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }

    async fn send_once(
        &self,
        url: &reqwest::Url,
        request: &RequestBuilder,
    ) -> Result<Response, FetchError> {
        let total = self.policy.timeout.total;
        let mut outbound = self
            .http
            .request(request.method.to_reqwest(), url.clone())
            .timeout(total);

        for (key, value) in &request.headers {
            outbound = outbound.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            outbound = outbound.body(body.clone());
        }

        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout(total)
            } else if e.is_connect() {
                FetchError::Connection(e.to_string())
            } else {
                FetchError::RequestError(e.to_string())
            }
        };

        let response = outbound.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        Ok(Response::new(status, headers, body))
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder<'a> {
    client: &'a FetchClient,
    builder: RequestBuilder,
}

impl ClientRequestBuilder<'_> {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_auth(token);
        self
    }

    /// The request as it will be sent.
    pub fn as_request(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Send the request under the client's fetch policy.
    ///
    /// Non-2xx responses are returned as `Ok`; use
    /// [`Response::error_for_status`] to turn them into errors.
    pub async fn send(self) -> Result<Response, FetchError> {
        self.client.execute(&self.builder).await
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, FetchPolicy, Method, Response};
}
