//! Handle.net REST API client.
//!
//! The Handle server does not allocate suffixes, so the client generates a
//! UUID suffix and creates it with
//! `PUT /api/handles/<prefix>/<suffix>?overwrite=false`. Each payload key
//! becomes one handle value; a `URL` key always takes index 1.

use super::{join_url, BasicAuth, HttpConfig, HttpTransport, MintClient, MintRequest, MintResponse};
use crate::error::{ParseError, TransportError};
use crate::payload::MintPayload;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

/// Response code the Handle REST API uses for success.
const HANDLE_SUCCESS: i64 = 1;

/// Handle server specific configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleConfig {
    /// Base URL of the handle server (e.g. `https://hdl.example.org:8000`).
    pub base_url: String,
    /// Handle prefix (e.g. `20.500.12345`).
    pub prefix: String,
    /// Admin identity, `<index>:<admin handle>` (e.g. `300:0.NA/20.500.12345`).
    pub username: String,
    pub password: String,
    /// Index of the admin value on the admin handle.
    pub admin_index: u32,
    /// Handle permission bit string stored in `HS_ADMIN`.
    pub admin_permissions: String,
    pub http: HttpConfig,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:8000".to_string(),
            prefix: "20.500.12345".to_string(),
            username: String::new(),
            password: String::new(),
            admin_index: 300,
            admin_permissions: "011111110011".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HandleResponse {
    #[serde(rename = "responseCode")]
    response_code: i64,
    handle: Option<String>,
}

/// Handle.net minting client.
pub struct HandleClient {
    config: HandleConfig,
    transport: HttpTransport,
}

impl HandleClient {
    pub fn new(config: HandleConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.http)?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &HandleConfig {
        &self.config
    }

    /// Handle values for `payload`, followed by the `HS_ADMIN` value.
    ///
    /// The first key matching `url` (any case) becomes the `URL` value at
    /// index 1 and leads the list; further URL keys are dropped. Other keys
    /// take indices from 2 in payload order.
    pub fn values(&self, payload: &MintPayload) -> Vec<Value> {
        let mut values = Vec::with_capacity(payload.len() + 1);
        let mut url = None;
        let mut next_index = 2;

        for (key, value) in payload.iter() {
            if key.eq_ignore_ascii_case("url") {
                if url.is_some() {
                    debug!(key, "Dropping duplicate URL value");
                } else {
                    url = Some(string_value(1, "URL", value));
                }
                continue;
            }
            values.push(string_value(next_index, key, value));
            next_index += 1;
        }
        if let Some(url) = url {
            values.insert(0, url);
        }

        values.push(json!({
            "index": 100,
            "type": "HS_ADMIN",
            "data": {
                "format": "admin",
                "value": {
                    "handle": format!("0.NA/{}", self.config.prefix),
                    "index": self.config.admin_index,
                    "permissions": self.config.admin_permissions,
                },
            },
        }));
        values
    }
}

fn string_value(index: u32, kind: &str, value: &str) -> Value {
    json!({
        "index": index,
        "type": kind,
        "data": { "format": "string", "value": value },
    })
}

#[async_trait]
impl MintClient for HandleClient {
    fn protocol(&self) -> &'static str {
        "handle"
    }

    fn build_request(&self, payload: &MintPayload) -> MintRequest {
        let suffix = Uuid::new_v4().to_string();
        let username = urlencoding::encode(&self.config.username).into_owned();

        MintRequest {
            method: Method::PUT,
            url: join_url(
                &self.config.base_url,
                &format!("api/handles/{}/{}", self.config.prefix, suffix),
            ),
            query: vec![("overwrite".to_string(), "false".to_string())],
            content_type: "application/json".to_string(),
            accept: Some("application/json".to_string()),
            auth: BasicAuth::from_credentials(&username, &self.config.password),
            body: json!({ "values": self.values(payload) }).to_string(),
        }
    }

    async fn send(&self, request: MintRequest) -> Result<MintResponse, TransportError> {
        self.transport.execute(request).await
    }

    fn extract_identifier(&self, response: MintResponse) -> Result<String, ParseError> {
        let parsed: HandleResponse = serde_json::from_str(&response.body)
            .map_err(|e| ParseError::Malformed(format!("invalid Handle response: {e}")))?;

        if parsed.response_code != HANDLE_SUCCESS {
            return Err(ParseError::Malformed(format!(
                "Handle server returned responseCode {}",
                parsed.response_code
            )));
        }

        match parsed.handle {
            Some(handle) if !handle.is_empty() => {
                debug!(handle = %handle, "Parsed Handle response");
                Ok(handle)
            }
            _ => Err(ParseError::Malformed("Handle response has no handle".to_string())),
        }
    }
}
