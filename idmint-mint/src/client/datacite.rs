//! DataCite REST API client (DOIs).
//!
//! Creates a DOI with `POST /dois` and a JSON:API document. DataCite
//! generates the suffix when only `prefix` is sent; the new DOI comes back
//! as `data.id`.

use super::{join_url, BasicAuth, HttpConfig, HttpTransport, MintClient, MintRequest, MintResponse};
use crate::error::{ParseError, TransportError};
use crate::payload::MintPayload;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

const JSON_API: &str = "application/vnd.api+json";

/// DataCite specific configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataCiteConfig {
    /// Base URL of the REST API (e.g. `https://api.datacite.org`).
    pub base_url: String,
    /// DOI prefix owned by the repository account.
    pub prefix: String,
    /// Repository account id.
    pub username: String,
    pub password: String,
    /// State transition to request: `publish`, `register` or `hide`.
    /// `None` creates a draft DOI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    pub http: HttpConfig,
}

impl Default for DataCiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.datacite.org".to_string(),
            prefix: "10.5072".to_string(),
            username: String::new(),
            password: String::new(),
            event: None,
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DoiDocument {
    data: DoiData,
}

#[derive(Debug, Deserialize)]
struct DoiData {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// DataCite minting client.
pub struct DataCiteClient {
    config: DataCiteConfig,
    transport: HttpTransport,
}

impl DataCiteClient {
    pub fn new(config: DataCiteConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.http)?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &DataCiteConfig {
        &self.config
    }

    /// Builds the `attributes` object of the request document.
    ///
    /// `title`, `creator` and `resourceTypeGeneral` are lifted into their
    /// nested DataCite shapes. Every other key is passed through as a
    /// top-level string attribute, except `prefix` and `event`, which only
    /// ever come from the account configuration.
    pub fn attributes(&self, payload: &MintPayload) -> Map<String, Value> {
        let mut attributes = Map::new();
        attributes.insert("prefix".into(), Value::String(self.config.prefix.clone()));
        if let Some(event) = &self.config.event {
            attributes.insert("event".into(), Value::String(event.clone()));
        }

        for (key, value) in payload.iter() {
            match key {
                "prefix" | "event" => {
                    debug!(key, "Ignoring payload key reserved for the DataCite account");
                }
                "title" => push_item(&mut attributes, "titles", json!({ "title": value })),
                "creator" => push_item(&mut attributes, "creators", json!({ "name": value })),
                "resourceTypeGeneral" => {
                    attributes.insert("types".into(), json!({ "resourceTypeGeneral": value }));
                }
                _ => {
                    attributes.insert(key.to_string(), Value::String(value.to_string()));
                }
            }
        }
        attributes
    }
}

fn push_item(attributes: &mut Map<String, Value>, name: &str, item: Value) {
    let list = attributes
        .entry(name)
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(items) = list {
        items.push(item);
    }
}

#[async_trait]
impl MintClient for DataCiteClient {
    fn protocol(&self) -> &'static str {
        "datacite"
    }

    fn build_request(&self, payload: &MintPayload) -> MintRequest {
        let document = json!({
            "data": {
                "type": "dois",
                "attributes": self.attributes(payload),
            }
        });

        MintRequest {
            method: Method::POST,
            url: join_url(&self.config.base_url, "dois"),
            query: Vec::new(),
            content_type: JSON_API.to_string(),
            accept: Some(JSON_API.to_string()),
            auth: BasicAuth::from_credentials(&self.config.username, &self.config.password),
            body: document.to_string(),
        }
    }

    async fn send(&self, request: MintRequest) -> Result<MintResponse, TransportError> {
        self.transport.execute(request).await
    }

    fn extract_identifier(&self, response: MintResponse) -> Result<String, ParseError> {
        let document: DoiDocument = serde_json::from_str(&response.body)
            .map_err(|e| ParseError::Malformed(format!("invalid DataCite response: {e}")))?;

        if document.data.kind.as_deref().is_some_and(|kind| kind != "dois") {
            return Err(ParseError::Malformed(format!(
                "unexpected DataCite resource type: {}",
                document.data.kind.unwrap_or_default()
            )));
        }

        match document.data.id {
            Some(doi) if !doi.trim().is_empty() => {
                debug!(doi = %doi, "Parsed DataCite response");
                Ok(doi.trim().to_string())
            }
            _ => Err(ParseError::Malformed("DataCite response has no data.id".to_string())),
        }
    }
}
