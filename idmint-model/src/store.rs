//! Entity persistence behind [`FieldAccessor::save`].

use crate::{AcceptAll, Entity, EntityValidator, FieldAccessor, SaveError};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Persists entities on behalf of a [`StoredEntity`].
pub trait EntityStore: Send + Sync {
    /// Validate and persist `entity`, replacing any previous version.
    fn save(&self, entity: &Entity) -> Result<(), SaveError>;
}

/// In-memory entity store keyed by entity id.
pub struct MemoryEntityStore {
    entities: Mutex<HashMap<String, Entity>>,
    validator: Box<dyn EntityValidator>,
    saves: Mutex<usize>,
}

impl MemoryEntityStore {
    /// Creates an empty store that accepts every write.
    pub fn new() -> Self {
        Self::with_validator(AcceptAll)
    }

    /// Creates an empty store that runs `validator` before each write.
    pub fn with_validator(validator: impl EntityValidator + 'static) -> Self {
        Self {
            entities: Mutex::new(HashMap::new()),
            validator: Box::new(validator),
            saves: Mutex::new(0),
        }
    }

    /// Returns the last persisted version of an entity.
    pub fn load(&self, id: &str) -> Option<Entity> {
        self.entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Number of successful saves since the store was created.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore for MemoryEntityStore {
    fn save(&self, entity: &Entity) -> Result<(), SaveError> {
        self.validator.validate(entity).map_err(SaveError::Validation)?;

        let mut entities = self
            .entities
            .lock()
            .map_err(|_| SaveError::Storage("entity map lock poisoned".to_string()))?;
        entities.insert(entity.id.clone(), entity.clone());
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;

        debug!(entity_id = %entity.id, "Persisted entity");
        Ok(())
    }
}

/// An [`Entity`] paired with the store that persists it.
///
/// This is the adapter that gives a plain entity the [`FieldAccessor`]
/// capability.
pub struct StoredEntity<'s> {
    entity: Entity,
    store: &'s dyn EntityStore,
}

impl<'s> StoredEntity<'s> {
    pub fn new(entity: Entity, store: &'s dyn EntityStore) -> Self {
        Self { entity, store }
    }

    /// The in-memory entity, including unsaved changes.
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn into_inner(self) -> Entity {
        self.entity
    }
}

impl FieldAccessor for StoredEntity<'_> {
    fn entity_type(&self) -> &str {
        &self.entity.entity_type
    }

    fn bundle(&self) -> &str {
        &self.entity.bundle
    }

    fn has_field(&self, name: &str) -> bool {
        self.entity.has_field(name)
    }

    fn get_string(&self, name: &str) -> String {
        self.entity.field_string(name)
    }

    fn set(&mut self, name: &str, value: &str) {
        self.entity.set_field(name, value);
    }

    fn save(&mut self) -> Result<(), SaveError> {
        self.store.save(&self.entity)
    }
}
