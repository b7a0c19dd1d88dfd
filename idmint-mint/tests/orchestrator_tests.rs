mod common;

use common::{doi_resolver, thesis, ScriptedClient};
use idmint_config::{ConfigResolver, MemoryConfigStore};
use idmint_mint::{
    DataCiteClient, DataCiteConfig, EntityError, MintError, MintOrchestrator, OrchestratorConfig,
    Outcome, ParseError, PayloadError, TransportError, WriteError,
};
use idmint_model::{Entity, FieldAccessor, MemoryEntityStore, StoredEntity};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn datacite(server: &MockServer) -> DataCiteClient {
    DataCiteClient::new(DataCiteConfig {
        base_url: server.uri(),
        prefix: "10.1234".to_string(),
        ..Default::default()
    })
    .unwrap()
}

fn scripted(client: &Arc<ScriptedClient>) -> MintOrchestrator {
    MintOrchestrator::with_client(doi_resolver(), client.clone())
}

// ── End to end over HTTP ────────────────────────────────────────

#[tokio::test]
async fn mints_doi_and_writes_it_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dois"))
        .and(body_partial_json(json!({
            "data": {"attributes": {"titles": [{"title": "My Thesis"}]}}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "10.1234/abcd", "type": "dois"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = MintOrchestrator::new(doi_resolver(), datacite(&server));
    let store = MemoryEntityStore::new();
    let mut entity = StoredEntity::new(thesis("My Thesis"), &store);

    let outcome = orchestrator.execute(Some(&mut entity), "doi").await;

    assert_eq!(outcome.identifier(), Some("10.1234/abcd"));
    assert_eq!(entity.get_string("field_doi"), "10.1234/abcd");
    assert_eq!(
        store.load("1").unwrap().get_str("field_doi"),
        Some("10.1234/abcd")
    );
}

#[tokio::test]
async fn minimal_records_apply_to_any_entity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "10.1234/abcd", "type": "dois"}
        })))
        .mount(&server)
        .await;

    let store = MemoryConfigStore::new();
    store.insert("identifier.doi", json!({"field": "field_doi"}));
    store.insert(
        "data_profile.doi",
        json!({"data": [{"source_field": "title", "key": "title"}]}),
    );
    let orchestrator = MintOrchestrator::new(ConfigResolver::new(store), datacite(&server));
    let entities = MemoryEntityStore::new();
    let mut entity = StoredEntity::new(
        Entity::new("5", "media", "document")
            .with_field("title", "My Thesis")
            .with_field("field_doi", ""),
        &entities,
    );

    let outcome = orchestrator.execute(Some(&mut entity), "doi").await;

    assert_eq!(outcome.identifier(), Some("10.1234/abcd"));
    assert_eq!(entity.get_string("field_doi"), "10.1234/abcd");
}

#[tokio::test]
async fn server_error_leaves_field_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let orchestrator = MintOrchestrator::new(doi_resolver(), datacite(&server));
    let store = MemoryEntityStore::new();
    let mut entity = StoredEntity::new(thesis("My Thesis"), &store);

    let outcome = orchestrator.execute(Some(&mut entity), "doi").await;

    match outcome {
        Outcome::Failed(MintError::Transport(TransportError::BadResponse { status, body })) => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal error");
        }
        other => panic!("expected BadResponse, got {other:?}"),
    }
    assert_eq!(entity.get_string("field_doi"), "");
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn malformed_response_is_not_written() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let orchestrator = MintOrchestrator::new(doi_resolver(), datacite(&server));
    let store = MemoryEntityStore::new();
    let mut entity = StoredEntity::new(thesis("My Thesis"), &store);

    let outcome = orchestrator.execute(Some(&mut entity), "doi").await;

    assert!(matches!(
        outcome,
        Outcome::Failed(MintError::Parse(ParseError::Malformed(_)))
    ));
    assert_eq!(entity.get_string("field_doi"), "");
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn repeated_execution_mints_again() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "10.1234/abcd", "type": "dois"}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let orchestrator = MintOrchestrator::new(doi_resolver(), datacite(&server));
    let store = MemoryEntityStore::new();
    let mut entity = StoredEntity::new(thesis("My Thesis"), &store);

    assert!(orchestrator.execute(Some(&mut entity), "doi").await.is_minted());
    assert!(orchestrator.execute(Some(&mut entity), "doi").await.is_minted());
    assert_eq!(store.save_count(), 2);
}

// ── Resolution and targeting ────────────────────────────────────

#[tokio::test]
async fn unknown_identifier_type_makes_no_call() {
    let client = Arc::new(ScriptedClient::minting("10.1234/abcd"));
    let orchestrator = scripted(&client);
    let store = MemoryEntityStore::new();
    let mut entity = StoredEntity::new(thesis("T"), &store);

    let outcome = orchestrator.execute(Some(&mut entity), "ark").await;

    assert_eq!(outcome.error().map(MintError::kind), Some("config_missing"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn missing_data_profile_makes_no_call() {
    let store = MemoryConfigStore::new();
    store.insert("identifier.doi", json!({"field": "field_doi"}));
    let client = Arc::new(ScriptedClient::minting("10.1234/abcd"));
    let orchestrator = MintOrchestrator::with_client(ConfigResolver::new(store), client.clone());
    let entities = MemoryEntityStore::new();
    let mut entity = StoredEntity::new(thesis("T"), &entities);

    let outcome = orchestrator.execute(Some(&mut entity), "doi").await;

    match outcome {
        Outcome::Failed(MintError::Config(e)) => assert!(e.is_missing()),
        other => panic!("expected missing config, got {other:?}"),
    }
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn absent_entity_is_invalid_target() {
    let client = Arc::new(ScriptedClient::minting("10.1234/abcd"));
    let orchestrator = scripted(&client);

    let outcome = orchestrator.execute(None, "doi").await;

    assert!(matches!(
        outcome,
        Outcome::Failed(MintError::Entity(EntityError::InvalidTarget(_)))
    ));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn wrong_bundle_is_invalid_target() {
    let client = Arc::new(ScriptedClient::minting("10.1234/abcd"));
    let orchestrator = scripted(&client);
    let store = MemoryEntityStore::new();
    let mut entity = StoredEntity::new(
        Entity::new("7", "node", "article")
            .with_field("title", "T")
            .with_field("field_doi", ""),
        &store,
    );

    let outcome = orchestrator.execute(Some(&mut entity), "doi").await;

    assert_eq!(outcome.error().map(MintError::kind), Some("invalid_target"));
    assert_eq!(client.calls(), 0);
    assert_eq!(entity.get_string("field_doi"), "");
}

#[tokio::test]
async fn missing_target_field_after_mint() {
    let client = Arc::new(ScriptedClient::minting("10.1234/lost"));
    let orchestrator = scripted(&client);
    let store = MemoryEntityStore::new();
    let mut entity = StoredEntity::new(
        Entity::new("1", "node", "thesis").with_field("title", "T"),
        &store,
    );

    let outcome = orchestrator.execute(Some(&mut entity), "doi").await;

    let error = outcome.error().unwrap();
    assert!(matches!(
        error,
        MintError::Write(WriteError::NoSuchField { field, .. }) if field == "field_doi"
    ));
    assert_eq!(error.kind(), "no_such_field");
    assert_eq!(error.orphaned_identifier(), Some("10.1234/lost"));
    assert!(error.to_string().contains("10.1234/lost"));
    assert_eq!(client.calls(), 1);
    assert!(!entity.has_field("field_doi"));
}

// ── Payload handling ────────────────────────────────────────────

#[tokio::test]
async fn empty_payload_still_mints_by_default() {
    let client = Arc::new(ScriptedClient::minting("10.1234/empty"));
    let orchestrator = scripted(&client);
    let store = MemoryEntityStore::new();
    let mut entity = StoredEntity::new(
        Entity::new("1", "node", "thesis").with_field("field_doi", ""),
        &store,
    );

    let outcome = orchestrator.execute(Some(&mut entity), "doi").await;

    assert_eq!(outcome.identifier(), Some("10.1234/empty"));
    assert!(client.payloads.lock().unwrap()[0].is_empty());
}

#[tokio::test]
async fn strict_profiles_reject_missing_source_fields() {
    let client = Arc::new(ScriptedClient::minting("10.1234/abcd"));
    let orchestrator = scripted(&client).with_config(OrchestratorConfig {
        strict_profiles: true,
    });
    let store = MemoryEntityStore::new();
    let mut entity = StoredEntity::new(
        Entity::new("1", "node", "thesis").with_field("field_doi", ""),
        &store,
    );

    let outcome = orchestrator.execute(Some(&mut entity), "doi").await;

    match outcome {
        Outcome::Failed(MintError::Payload(PayloadError::MissingSourceFields {
            profile,
            fields,
        })) => {
            assert_eq!(profile, "doi");
            assert_eq!(fields, vec!["title".to_string()]);
        }
        other => panic!("expected MissingSourceFields, got {other:?}"),
    }
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn strict_profiles_reject_empty_payload() {
    let store = MemoryConfigStore::new();
    store.insert("identifier.doi", json!({"field": "field_doi"}));
    store.insert("data_profile.doi", json!({"data": []}));
    let client = Arc::new(ScriptedClient::minting("10.1234/abcd"));
    let orchestrator = MintOrchestrator::with_client(ConfigResolver::new(store), client.clone())
        .with_config(OrchestratorConfig {
            strict_profiles: true,
        });
    let entities = MemoryEntityStore::new();
    let mut entity = StoredEntity::new(thesis("T"), &entities);

    let outcome = orchestrator.execute(Some(&mut entity), "doi").await;

    assert!(matches!(
        outcome,
        Outcome::Failed(MintError::Payload(PayloadError::Empty { .. }))
    ));
    assert_eq!(client.calls(), 0);
}

// ── Failure reporting ───────────────────────────────────────────

#[tokio::test]
async fn transport_failure_is_reported() {
    let client = Arc::new(ScriptedClient::failing(TransportError::Timeout));
    let orchestrator = scripted(&client);
    let store = MemoryEntityStore::new();
    let mut entity = StoredEntity::new(thesis("T"), &store);

    let outcome = orchestrator.execute(Some(&mut entity), "doi").await;

    assert_eq!(outcome.error().map(MintError::kind), Some("timeout"));
    assert_eq!(entity.get_string("field_doi"), "");
}

#[tokio::test]
async fn persist_failure_carries_orphaned_identifier() {
    let client = Arc::new(ScriptedClient::minting("10.1234/orphan"));
    let orchestrator = scripted(&client);
    let store = MemoryEntityStore::with_validator(|_: &Entity| -> Result<(), String> {
        Err("field_doi is read-only".to_string())
    });
    let mut entity = StoredEntity::new(thesis("T"), &store);

    let outcome = orchestrator.execute(Some(&mut entity), "doi").await;

    let error = outcome.error().unwrap();
    assert_eq!(error.kind(), "persist_failed");
    assert_eq!(error.orphaned_identifier(), Some("10.1234/orphan"));
    assert!(store.load("1").is_none());
}

// ── Batches ─────────────────────────────────────────────────────

#[tokio::test]
async fn batch_continues_past_failures() {
    let client = Arc::new(ScriptedClient::minting("10.1234/same"));
    let orchestrator = scripted(&client);
    let store = MemoryEntityStore::new();
    let mut first = StoredEntity::new(thesis("First"), &store);
    let mut wrong = StoredEntity::new(
        Entity::new("2", "user", "").with_field("field_doi", ""),
        &store,
    );
    let mut third = StoredEntity::new(
        Entity::new("3", "node", "thesis")
            .with_field("title", "Third")
            .with_field("field_doi", ""),
        &store,
    );

    let mut entities: Vec<&mut dyn FieldAccessor> = vec![&mut first, &mut wrong, &mut third];
    let outcomes = orchestrator.execute_batch(&mut entities, "doi").await;

    assert_eq!(
        outcomes.iter().map(Outcome::is_minted).collect::<Vec<_>>(),
        [true, false, true]
    );
    assert_eq!(client.calls(), 2);
    assert_eq!(third.get_string("field_doi"), "10.1234/same");
    assert_eq!(wrong.get_string("field_doi"), "");
}

#[tokio::test]
async fn concurrent_transactions_share_one_orchestrator() {
    let client = Arc::new(ScriptedClient::minting("10.1234/abcd"));
    let orchestrator = scripted(&client);
    let store = MemoryEntityStore::new();
    let mut a = StoredEntity::new(thesis("A"), &store);
    let mut b = StoredEntity::new(
        Entity::new("2", "node", "thesis")
            .with_field("title", "B")
            .with_field("field_doi", ""),
        &store,
    );

    let (left, right) = tokio::join!(
        orchestrator.execute(Some(&mut a), "doi"),
        orchestrator.execute(Some(&mut b), "doi"),
    );

    assert!(left.is_minted() && right.is_minted());
    assert_eq!(store.save_count(), 2);
    let titles: Vec<String> = client
        .payloads
        .lock()
        .unwrap()
        .iter()
        .filter_map(|p| p.get("title").map(str::to_string))
        .collect();
    assert_eq!(titles.len(), 2);
}
