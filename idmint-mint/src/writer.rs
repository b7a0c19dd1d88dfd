use crate::error::WriteError;
use idmint_model::FieldAccessor;
use tracing::debug;

/// Writes a minted identifier onto its target field and persists the entity.
pub struct FieldWriter;

impl FieldWriter {
    /// Sets `field` to `identifier` and saves the entity.
    ///
    /// Nothing is mutated unless both arguments are non-empty and the entity
    /// has `field`. A failed save leaves the identifier unrecorded and is
    /// reported as [`WriteError::PersistFailed`].
    pub fn write(
        entity: &mut dyn FieldAccessor,
        field: &str,
        identifier: &str,
    ) -> Result<(), WriteError> {
        if identifier.is_empty() {
            return Err(WriteError::EmptyIdentifier);
        }
        if field.is_empty() {
            return Err(WriteError::EmptyField);
        }
        if !entity.has_field(field) {
            return Err(WriteError::NoSuchField {
                field: field.to_string(),
                identifier: identifier.to_string(),
            });
        }

        entity.set(field, identifier);
        entity.save().map_err(|source| WriteError::PersistFailed {
            field: field.to_string(),
            identifier: identifier.to_string(),
            source,
        })?;

        debug!(field, identifier, "Identifier written to entity");
        Ok(())
    }
}
