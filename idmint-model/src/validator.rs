use crate::Entity;

/// Optional hook run by an [`EntityStore`](crate::EntityStore) before an
/// entity is persisted.
///
/// Most stores do not need one. Implement it when writes must be rejected,
/// e.g. a required field is empty or an identifier field has the wrong shape.
pub trait EntityValidator: Send + Sync {
    /// Validate an entity before it is persisted.
    /// Return `Err(message)` to reject the write.
    fn validate(&self, entity: &Entity) -> Result<(), String> {
        let _ = entity;
        Ok(())
    }
}

/// Validator that accepts every entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl EntityValidator for AcceptAll {}

impl<F> EntityValidator for F
where
    F: Fn(&Entity) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, entity: &Entity) -> Result<(), String> {
        self(entity)
    }
}
