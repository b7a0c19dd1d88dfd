//! EZID client (ARKs and DOIs).
//!
//! Mints against a shoulder with `POST /shoulder/<shoulder>` and an ANVL
//! body. A successful response reads `success: <identifier>`, optionally
//! followed by ` | <shadow ark>`.

use super::{
    anvl, join_url, BasicAuth, HttpConfig, HttpTransport, MintClient, MintRequest, MintResponse,
};
use crate::error::{ParseError, TransportError};
use crate::payload::MintPayload;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// EZID specific configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EzidConfig {
    /// Base URL of the EZID API (e.g. `https://ezid.cdlib.org`).
    pub base_url: String,
    /// Shoulder to mint under (e.g. `ark:/99999/fk4` or `doi:10.5072/FK2`).
    pub shoulder: String,
    pub username: String,
    pub password: String,
    pub http: HttpConfig,
}

impl Default for EzidConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ezid.cdlib.org".to_string(),
            shoulder: "ark:/99999/fk4".to_string(),
            username: String::new(),
            password: String::new(),
            http: HttpConfig::default(),
        }
    }
}

/// EZID minting client.
pub struct EzidClient {
    config: EzidConfig,
    transport: HttpTransport,
}

impl EzidClient {
    pub fn new(config: EzidConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.http)?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &EzidConfig {
        &self.config
    }
}

#[async_trait]
impl MintClient for EzidClient {
    fn protocol(&self) -> &'static str {
        "ezid"
    }

    fn build_request(&self, payload: &MintPayload) -> MintRequest {
        MintRequest {
            method: Method::POST,
            url: join_url(&self.config.base_url, &format!("shoulder/{}", self.config.shoulder)),
            query: Vec::new(),
            content_type: "text/plain; charset=UTF-8".to_string(),
            accept: Some("text/plain".to_string()),
            auth: BasicAuth::from_credentials(&self.config.username, &self.config.password),
            body: anvl::encode(payload.iter()),
        }
    }

    async fn send(&self, request: MintRequest) -> Result<MintResponse, TransportError> {
        self.transport.execute(request).await
    }

    fn extract_identifier(&self, response: MintResponse) -> Result<String, ParseError> {
        let pairs = anvl::decode(&response.body);

        if let Some((_, message)) = pairs.iter().find(|(name, _)| name == "error") {
            return Err(ParseError::Malformed(format!("EZID reported an error: {message}")));
        }

        let value = pairs
            .into_iter()
            .find(|(name, _)| name == "success")
            .map(|(_, value)| value)
            .ok_or_else(|| {
                ParseError::Malformed("no `success:` line in EZID response".to_string())
            })?;

        let identifier = value.split('|').next().unwrap_or_default().trim();
        if identifier.is_empty() {
            return Err(ParseError::Malformed("EZID returned an empty identifier".to_string()));
        }

        debug!(identifier, "Parsed EZID response");
        Ok(identifier.to_string())
    }
}
