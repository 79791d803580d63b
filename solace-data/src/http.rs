//! Shared HTTP plumbing for the catalogue and text-generation clients.
//!
//! The source traits in `solace-core` are synchronous so the core stays
//! embeddable in synchronous contexts. Each client owns a
//! [`reqwest::Client`] and a current-thread Tokio runtime, and blocks on its
//! async requests internally.
//!
//! When called from inside a multi-threaded Tokio runtime the client borrows
//! that runtime's handle through [`tokio::task::block_in_place`]; otherwise
//! (no runtime, or a `current_thread` runtime) it uses its own runtime.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use solace_core::SourceError;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "solace/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings shared by every HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpClientConfig {
    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Failure constructing an HTTP client.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] std::io::Error),
}

/// A `reqwest` client paired with the runtime that drives it.
pub(crate) struct HttpRuntime {
    client: Client,
    runtime: Runtime,
    timeout: Duration,
}

impl std::fmt::Debug for HttpRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRuntime")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpRuntime {
    pub(crate) fn new(config: &HttpClientConfig) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ClientBuildError::Runtime)?;
        Ok(Self {
            client,
            runtime,
            timeout: config.timeout,
        })
    }

    pub(crate) const fn client(&self) -> &Client {
        &self.client
    }

    /// Drive `future` to completion from synchronous code.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    /// Map a transport error onto [`SourceError`].
    pub(crate) fn convert_error(&self, error: &reqwest::Error, url: &str) -> SourceError {
        if error.is_timeout() {
            return SourceError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return SourceError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        SourceError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Send `request`, reject non-success statuses and decode a JSON body.
    pub(crate) async fn send_json<T>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T, SourceError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|err| self.convert_error(&err, url))?
            .error_for_status()
            .map_err(|err| self.convert_error(&err, url))?;
        response.json().await.map_err(|err| SourceError::Parse {
            message: err.to_string(),
        })
    }
}

/// Percent-encode a URL component, spaces included, as `%20`.
pub(crate) fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
