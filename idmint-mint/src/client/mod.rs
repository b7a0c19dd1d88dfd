//! Identifier service clients.
//!
//! Every registry protocol implements [`MintClient`]. The orchestrator only
//! depends on the trait, so adding a registry means adding one module here.

pub mod anvl;
pub mod datacite;
pub mod ezid;
pub mod handle;

pub use datacite::{DataCiteClient, DataCiteConfig};
pub use ezid::{EzidClient, EzidConfig};
pub use handle::{HandleClient, HandleConfig};

use crate::error::{ParseError, TransportError};
use crate::payload::MintPayload;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// HTTP settings shared by every registry client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Upper bound on one request, connection included.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("idmint/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP basic credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    /// Returns `None` when no username is configured.
    pub fn from_credentials(username: &str, password: &str) -> Option<Self> {
        (!username.is_empty()).then(|| Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A fully serialized request to an identifier service.
#[derive(Debug, Clone)]
pub struct MintRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub content_type: String,
    pub accept: Option<String>,
    pub auth: Option<BasicAuth>,
    pub body: String,
}

/// A successful (2xx) response from an identifier service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// One identifier registry protocol.
///
/// Implementations hold no per-transaction state; the same client may serve
/// any number of concurrent transactions.
#[async_trait]
pub trait MintClient: Send + Sync {
    /// Short protocol name used in logs.
    fn protocol(&self) -> &'static str;

    /// Serializes `payload` into the registry's wire format.
    fn build_request(&self, payload: &MintPayload) -> MintRequest;

    /// Performs the network call. Never retried.
    async fn send(&self, request: MintRequest) -> Result<MintResponse, TransportError>;

    /// Extracts the minted identifier from a successful response.
    fn extract_identifier(&self, response: MintResponse) -> Result<String, ParseError>;

    /// Builds and sends the request for `payload`.
    async fn mint(&self, payload: &MintPayload) -> Result<MintResponse, TransportError> {
        let request = self.build_request(payload);
        self.send(request).await
    }
}

/// Executes [`MintRequest`]s over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| {
                TransportError::ConnectionError(format!("failed to create HTTP client: {e}"))
            })?;
        Ok(Self { client })
    }

    /// Sends `request`. Any non-2xx status becomes [`TransportError::BadResponse`].
    pub async fn execute(&self, request: MintRequest) -> Result<MintResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "Sending mint request");

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .header(CONTENT_TYPE, request.content_type)
            .body(request.body);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(accept) = request.accept {
            builder = builder.header(ACCEPT, accept);
        }
        if let Some(auth) = request.auth {
            builder = builder.basic_auth(auth.username, Some(auth.password));
        }

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::BadResponse {
                status: status.as_u16(),
                body,
            });
        }

        Ok(MintResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// Selects and configures one registry protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum ServiceConfig {
    Ezid(EzidConfig),
    Datacite(DataCiteConfig),
    Handle(HandleConfig),
}

impl ServiceConfig {
    /// Builds the client for the configured protocol.
    pub fn into_client(self) -> Result<Arc<dyn MintClient>, TransportError> {
        let client: Arc<dyn MintClient> = match self {
            ServiceConfig::Ezid(config) => Arc::new(EzidClient::new(config)?),
            ServiceConfig::Datacite(config) => Arc::new(DataCiteClient::new(config)?),
            ServiceConfig::Handle(config) => Arc::new(HandleClient::new(config)?),
        };
        Ok(client)
    }
}

/// Joins a configured base URL and a path without doubling slashes.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
