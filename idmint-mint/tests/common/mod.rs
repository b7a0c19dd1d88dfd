//! Shared helpers for minting tests.

#![allow(dead_code)]

use async_trait::async_trait;
use idmint_config::{ConfigResolver, MemoryConfigStore};
use idmint_mint::{MintClient, MintPayload, MintRequest, MintResponse, ParseError, TransportError};
use idmint_model::Entity;
use reqwest::Method;
use serde_json::json;
use std::sync::Mutex;

/// A `node/thesis` entity with a title and an empty DOI field.
pub fn thesis(title: &str) -> Entity {
    Entity::new("1", "node", "thesis")
        .with_field("title", title)
        .with_field("field_doi", "")
}

/// Resolver holding the `doi` identifier type: `title` → `title`, written to `field_doi`.
pub fn doi_resolver() -> ConfigResolver {
    let store = MemoryConfigStore::from_json(json!({
        "identifier.doi": {
            "entity": "node",
            "bundle": "thesis",
            "field": "field_doi",
            "data_profile": "doi"
        },
        "data_profile.doi": {
            "entity": "node",
            "bundle": "thesis",
            "label": "DOI",
            "data": [{"source_field": "title", "key": "title"}]
        }
    }))
    .unwrap();
    ConfigResolver::new(store)
}

/// In-process client that returns canned results and records payloads.
pub struct ScriptedClient {
    pub result: Result<String, TransportError>,
    pub payloads: Mutex<Vec<MintPayload>>,
}

impl ScriptedClient {
    pub fn minting(identifier: &str) -> Self {
        Self {
            result: Ok(identifier.to_string()),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: TransportError) -> Self {
        Self {
            result: Err(error),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }
}

#[async_trait]
impl MintClient for ScriptedClient {
    fn protocol(&self) -> &'static str {
        "scripted"
    }

    fn build_request(&self, payload: &MintPayload) -> MintRequest {
        self.payloads.lock().unwrap().push(payload.clone());
        MintRequest {
            method: Method::POST,
            url: "http://scripted.invalid/mint".to_string(),
            query: Vec::new(),
            content_type: "text/plain".to_string(),
            accept: None,
            auth: None,
            body: String::new(),
        }
    }

    async fn send(&self, _request: MintRequest) -> Result<MintResponse, TransportError> {
        self.result.clone().map(|body| MintResponse {
            status: 201,
            content_type: None,
            body,
        })
    }

    fn extract_identifier(&self, response: MintResponse) -> Result<String, ParseError> {
        if response.body.is_empty() {
            Err(ParseError::Malformed("empty body".to_string()))
        } else {
            Ok(response.body)
        }
    }
}
