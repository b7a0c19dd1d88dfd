//! The minting transaction.

use crate::client::MintClient;
use crate::error::{EntityError, MintError, MintResult, PayloadError};
use crate::payload::PayloadBuilder;
use crate::writer::FieldWriter;
use idmint_config::ConfigResolver;
use idmint_model::FieldAccessor;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Orchestrator behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Fail before contacting the registry when the data profile maps a
    /// field the entity lacks, or when the payload comes out empty.
    /// Off by default: such entries are skipped and the mint proceeds.
    pub strict_profiles: bool,
}

/// Result of one minting transaction.
#[derive(Debug)]
pub enum Outcome {
    /// The identifier was minted and persisted on the entity.
    Minted(String),
    /// A stage failed; later stages did not run.
    Failed(MintError),
}

impl Outcome {
    pub fn is_minted(&self) -> bool {
        matches!(self, Outcome::Minted(_))
    }

    pub fn identifier(&self) -> Option<&str> {
        match self {
            Outcome::Minted(identifier) => Some(identifier),
            Outcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&MintError> {
        match self {
            Outcome::Minted(_) => None,
            Outcome::Failed(e) => Some(e),
        }
    }
}

/// Sequences resolve → build → mint → parse → write for one entity.
///
/// Holds no per-transaction state, so one orchestrator can serve concurrent
/// transactions for different entities.
pub struct MintOrchestrator {
    resolver: ConfigResolver,
    client: Arc<dyn MintClient>,
    config: OrchestratorConfig,
}

impl MintOrchestrator {
    pub fn new(resolver: ConfigResolver, client: impl MintClient + 'static) -> Self {
        Self::with_client(resolver, Arc::new(client))
    }

    pub fn with_client(resolver: ConfigResolver, client: Arc<dyn MintClient>) -> Self {
        Self {
            resolver,
            client,
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Mints an identifier of `identifier_type` for `entity`.
    ///
    /// `None` stands for an entity without field access and fails with
    /// [`EntityError::InvalidTarget`]. Every failure is logged and returned
    /// as [`Outcome::Failed`]; this never panics or propagates.
    pub async fn execute(
        &self,
        entity: Option<&mut dyn FieldAccessor>,
        identifier_type: &str,
    ) -> Outcome {
        match self.run(entity, identifier_type).await {
            Ok(identifier) => {
                info!(
                    identifier_type,
                    protocol = self.client.protocol(),
                    identifier = %identifier,
                    "Minted identifier"
                );
                Outcome::Minted(identifier)
            }
            Err(e) => {
                if let Some(orphan) = e.orphaned_identifier() {
                    error!(
                        identifier_type,
                        orphaned_identifier = orphan,
                        "Identifier minted but not recorded on the entity: {e}"
                    );
                } else {
                    error!(identifier_type, kind = e.kind(), "Minting failed: {e}");
                }
                Outcome::Failed(e)
            }
        }
    }

    /// Runs [`execute`](Self::execute) for each entity in turn.
    ///
    /// One outcome per entity, in input order. A failure never stops the batch.
    pub async fn execute_batch(
        &self,
        entities: &mut [&mut dyn FieldAccessor],
        identifier_type: &str,
    ) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(entities.len());
        for entity in entities.iter_mut() {
            outcomes.push(self.execute(Some(&mut **entity), identifier_type).await);
        }
        outcomes
    }

    async fn run(
        &self,
        entity: Option<&mut dyn FieldAccessor>,
        identifier_type: &str,
    ) -> MintResult<String> {
        let entity = entity.ok_or_else(|| {
            EntityError::InvalidTarget("entity does not expose fields".to_string())
        })?;

        let configs = self.resolver.resolve(identifier_type)?;
        if !configs
            .identifier
            .applies_to(entity.entity_type(), entity.bundle())
        {
            return Err(EntityError::InvalidTarget(format!(
                "identifier {} is configured for {}/{}, not {}/{}",
                configs.identifier.id,
                configs.identifier.entity_type,
                configs.identifier.bundle,
                entity.entity_type(),
                entity.bundle(),
            ))
            .into());
        }

        let profile = &configs.data_profile;
        if self.config.strict_profiles {
            let missing = PayloadBuilder::missing_source_fields(profile, &*entity);
            if !missing.is_empty() {
                return Err(PayloadError::MissingSourceFields {
                    profile: profile.id.clone(),
                    fields: missing,
                }
                .into());
            }
        }

        let payload = PayloadBuilder::build(Some(profile), Some(&*entity));
        if payload.is_empty() {
            let degraded = PayloadError::Empty {
                profile: profile.id.clone(),
            };
            if self.config.strict_profiles {
                return Err(degraded.into());
            }
            warn!(identifier_type, "{degraded}; minting without metadata");
        }

        let response = self.client.mint(&payload).await?;
        let identifier = self.client.extract_identifier(response)?;

        FieldWriter::write(entity, &configs.identifier.field, &identifier)?;
        Ok(identifier)
    }
}
