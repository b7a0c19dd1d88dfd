//! Configuration store abstraction.

use crate::error::{ConfigError, ConfigResult};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Read access to configuration records by fully-qualified name.
pub trait ConfigStore: Send + Sync {
    /// Returns the record stored under `name`, if any.
    fn get(&self, name: &str) -> ConfigResult<Option<Value>>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    fn get(&self, name: &str) -> ConfigResult<Option<Value>> {
        (**self).get(name)
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for Box<T> {
    fn get(&self, name: &str) -> ConfigResult<Option<Value>> {
        (**self).get(name)
    }
}

/// In-memory configuration store.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    records: RwLock<HashMap<String, Value>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a JSON object mapping record names to records.
    pub fn from_json(value: Value) -> ConfigResult<Self> {
        let Value::Object(map) = value else {
            return Err(ConfigError::Invalid {
                key: "<root>".to_string(),
                reason: "expected an object of named records".to_string(),
            });
        };
        Ok(Self {
            records: RwLock::new(map.into_iter().collect()),
        })
    }

    /// Loads a store from a JSON file (see [`from_json`](Self::from_json)).
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(serde_json::from_str(&content)?)
    }

    /// Inserts or replaces a record.
    pub fn insert(&self, name: impl Into<String>, record: Value) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), record);
    }

    /// Removes a record, returning it if present.
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, name: &str) -> ConfigResult<Option<Value>> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned())
    }
}
