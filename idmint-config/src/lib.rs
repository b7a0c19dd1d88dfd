//! Configuration lookup for idmint.
//!
//! Configuration records live in a key-value store under fully-qualified
//! names:
//!
//! - `identifier.<id>` → [`IdentifierConfig`](idmint_model::IdentifierConfig)
//! - `data_profile.<id>` → [`DataProfileConfig`](idmint_model::DataProfileConfig)
//!
//! The [`ConfigResolver`] pairs the two for an identifier type. The core only
//! ever reads configuration; authoring it is left to the host.

mod error;
mod resolver;
mod sqlite;
mod store;

pub use error::{ConfigError, ConfigResult};
pub use resolver::{ConfigResolver, ResolvedConfigs, DATA_PROFILE_NAMESPACE, IDENTIFIER_NAMESPACE};
pub use sqlite::SqliteConfigStore;
pub use store::{ConfigStore, MemoryConfigStore};
