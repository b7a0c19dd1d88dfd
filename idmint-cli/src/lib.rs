//! File-backed plumbing for the `idmint` binary.
//!
//! The binary mints for one entity stored as a JSON file. The service
//! definition is a JSON file. Configuration records come from either a
//! JSON file or a SQLite store (`.sqlite` / `.db`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use idmint_config::{ConfigResolver, ConfigStore, MemoryConfigStore, SqliteConfigStore};
use idmint_mint::{MintOrchestrator, OrchestratorConfig, Outcome, ServiceConfig};
use idmint_model::{Entity, EntityStore, SaveError, StoredEntity};
use tracing::debug;

/// Persists an entity as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct FileEntityStore {
    path: PathBuf,
}

impl FileEntityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Entity> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read entity file {}", self.path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse entity file {}", self.path.display()))
    }
}

impl EntityStore for FileEntityStore {
    fn save(&self, entity: &Entity) -> Result<(), SaveError> {
        let data = serde_json::to_string_pretty(entity)
            .map_err(|e| SaveError::Storage(format!("serialize entity {}: {e}", entity.id)))?;
        fs::write(&self.path, data + "\n")
            .map_err(|e| SaveError::Storage(format!("write {}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), "Wrote entity");
        Ok(())
    }
}

/// One `idmint mint` invocation.
#[derive(Debug, Clone)]
pub struct MintJob {
    /// Configuration records, see [`open_config_store`].
    pub configs: PathBuf,
    /// JSON [`ServiceConfig`].
    pub service: PathBuf,
    /// JSON [`Entity`]; rewritten in place when the identifier is recorded.
    pub entity: PathBuf,
    pub identifier_type: String,
    pub prefix: Option<String>,
    pub strict: bool,
}

/// Opens the configuration records at `path`.
///
/// `.sqlite` and `.db` files are opened as a [`SqliteConfigStore`]; anything
/// else is read as a JSON object of record name → record.
pub fn open_config_store(path: &Path) -> Result<Box<dyn ConfigStore>> {
    let store: Box<dyn ConfigStore> = if is_sqlite(path) {
        Box::new(
            SqliteConfigStore::new(path)
                .with_context(|| format!("Failed to open config store {}", path.display()))?,
        )
    } else {
        Box::new(
            MemoryConfigStore::from_file(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        )
    };
    Ok(store)
}

/// Copies the JSON configuration records at `json` into the SQLite store at
/// `db`, creating it if needed. Returns the number of records written.
pub fn import_configs(json: &Path, db: &Path) -> Result<usize> {
    let data = fs::read_to_string(json)
        .with_context(|| format!("Failed to read configuration {}", json.display()))?;
    let records = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse configuration {}", json.display()))?;
    let store = SqliteConfigStore::new(db)
        .with_context(|| format!("Failed to open config store {}", db.display()))?;
    store
        .import(records)
        .with_context(|| format!("Failed to import into {}", db.display()))
}

fn is_sqlite(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sqlite") || ext.eq_ignore_ascii_case("db"))
}

/// Loads a service definition.
pub fn load_service(path: &Path) -> Result<ServiceConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read service file {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse service file {}", path.display()))
}

/// Runs one minting transaction.
///
/// `Err` means the job could not be set up (unreadable files, bad service
/// definition). Failures of the transaction itself come back as
/// [`Outcome::Failed`].
pub async fn run(job: &MintJob) -> Result<Outcome> {
    let mut resolver = ConfigResolver::new(open_config_store(&job.configs)?);
    if let Some(prefix) = &job.prefix {
        resolver = resolver.with_prefix(prefix.as_str());
    }

    let client = load_service(&job.service)?
        .into_client()
        .context("Failed to create service client")?;
    let orchestrator = MintOrchestrator::with_client(resolver, client).with_config(
        OrchestratorConfig {
            strict_profiles: job.strict,
        },
    );

    let entities = FileEntityStore::new(job.entity.clone());
    let mut entity = StoredEntity::new(entities.load()?, &entities);
    Ok(orchestrator
        .execute(Some(&mut entity), &job.identifier_type)
        .await)
}
