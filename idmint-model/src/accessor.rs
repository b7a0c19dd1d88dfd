use thiserror::Error;

/// Errors raised by the entity store when persisting a field write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    /// The entity failed validation and was not persisted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The backing store could not persist the entity.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Minimal view over a fieldable entity.
///
/// This is the only surface the minting core touches: it never creates,
/// deletes or queries entities. Any host entity type plugs in through an
/// adapter implementing this trait.
pub trait FieldAccessor: Send {
    /// Machine name of the entity type (e.g. `node`).
    fn entity_type(&self) -> &str;

    /// Bundle of the entity (e.g. `thesis`).
    fn bundle(&self) -> &str;

    /// Whether the entity's field set contains `name`, regardless of value.
    fn has_field(&self, name: &str) -> bool;

    /// String rendering of a field. Absent or empty fields render as `""`.
    fn get_string(&self, name: &str) -> String;

    /// Set a field value in memory. Nothing is persisted until [`save`](Self::save).
    fn set(&mut self, name: &str, value: &str);

    /// Persist pending changes.
    fn save(&mut self) -> Result<(), SaveError>;
}
