//! Identifier minting pipeline.
//!
//! Mints a persistent identifier (DOI, ARK, Handle) for one entity by
//! delegating to an external registry, then writes the identifier back onto
//! the entity.
//!
//! # Pipeline
//!
//! 1. **Resolve**: [`ConfigResolver`](idmint_config::ConfigResolver) finds the
//!    identifier and data profile records for the identifier type
//! 2. **Build**: [`PayloadBuilder`] maps entity fields to payload keys
//! 3. **Mint**: a [`MintClient`] serializes the payload and calls its registry
//! 4. **Parse**: the same client extracts the identifier from the response
//! 5. **Write**: [`FieldWriter`] stores the identifier on the target field
//!
//! [`MintOrchestrator`] sequences the stages and turns any stage failure into
//! an [`Outcome::Failed`]. Nothing is retried and nothing is rolled back: at
//! most one registry call is made per transaction.
//!
//! # Example
//!
//! ```no_run
//! use idmint_config::{ConfigResolver, MemoryConfigStore};
//! use idmint_mint::{DataCiteClient, DataCiteConfig, MintOrchestrator};
//! use idmint_model::{Entity, MemoryEntityStore, StoredEntity};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = ConfigResolver::new(MemoryConfigStore::new());
//! let client = DataCiteClient::new(DataCiteConfig::default())?;
//! let orchestrator = MintOrchestrator::new(resolver, client);
//!
//! let store = MemoryEntityStore::new();
//! let mut entity = StoredEntity::new(Entity::new("1", "node", "thesis"), &store);
//! let outcome = orchestrator.execute(Some(&mut entity), "doi").await;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod client;
mod error;
mod orchestrator;
mod payload;
mod writer;

pub use client::{
    BasicAuth, DataCiteClient, DataCiteConfig, EzidClient, EzidConfig, HandleClient, HandleConfig,
    HttpConfig, HttpTransport, MintClient, MintRequest, MintResponse, ServiceConfig,
};
pub use error::{
    EntityError, MintError, MintResult, ParseError, PayloadError, TransportError, WriteError,
};
pub use orchestrator::{MintOrchestrator, OrchestratorConfig, Outcome};
pub use payload::{MintPayload, PayloadBuilder};
pub use writer::FieldWriter;
