use crate::error::{ConfigError, ConfigResult};
use crate::store::ConfigStore;
use idmint_model::{DataProfileConfig, IdentifierConfig};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Namespace of identifier records.
pub const IDENTIFIER_NAMESPACE: &str = "identifier";

/// Namespace of data profile records.
pub const DATA_PROFILE_NAMESPACE: &str = "data_profile";

/// The configuration pair a minting transaction runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfigs {
    pub identifier: IdentifierConfig,
    pub data_profile: DataProfileConfig,
}

/// Looks up the identifier and data profile records for an identifier type.
#[derive(Clone)]
pub struct ConfigResolver {
    store: Arc<dyn ConfigStore>,
    prefix: Option<String>,
}

impl ConfigResolver {
    pub fn new(store: impl ConfigStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
            prefix: None,
        }
    }

    /// Prepends `prefix.` to every record name, e.g. `dgi_actions.identifier.doi`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    /// Fully-qualified name of an identifier record.
    pub fn identifier_key(&self, id: &str) -> String {
        self.qualify(IDENTIFIER_NAMESPACE, id)
    }

    /// Fully-qualified name of a data profile record.
    pub fn data_profile_key(&self, id: &str) -> String {
        self.qualify(DATA_PROFILE_NAMESPACE, id)
    }

    fn qualify(&self, namespace: &str, id: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}.{namespace}.{id}"),
            None => format!("{namespace}.{id}"),
        }
    }

    /// Resolves both records for `identifier_type`.
    ///
    /// Either both records are returned or an error is; a present identifier
    /// record is never returned without its data profile.
    pub fn resolve(&self, identifier_type: &str) -> ConfigResult<ResolvedConfigs> {
        let identifier_key = self.identifier_key(identifier_type);
        let mut identifier: IdentifierConfig = self.load(&identifier_key)?;
        if identifier.id.is_empty() {
            identifier.id = identifier_type.to_string();
        }
        if identifier.field.is_empty() {
            return Err(ConfigError::Invalid {
                key: identifier_key,
                reason: "target field is empty".to_string(),
            });
        }

        let profile_id = identifier.data_profile_ref().to_string();
        let mut data_profile: DataProfileConfig = self.load(&self.data_profile_key(&profile_id))?;
        if data_profile.id.is_empty() {
            data_profile.id = profile_id;
        }

        debug!(
            identifier = %identifier.id,
            data_profile = %data_profile.id,
            entries = data_profile.entries.len(),
            "Resolved identifier configuration"
        );

        Ok(ResolvedConfigs {
            identifier,
            data_profile,
        })
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<T> {
        let record = self.store.get(key)?.ok_or_else(|| ConfigError::Missing {
            key: key.to_string(),
        })?;
        serde_json::from_value(record).map_err(|e| ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}
