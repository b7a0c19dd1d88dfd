use idmint_model::{DataProfileConfig, FieldAccessor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

/// Ordered key → value payload sent to an identifier service.
///
/// Keys keep the order of the data profile entries that produced them.
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintPayload {
    entries: Vec<(String, String)>,
}

impl MintPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MintPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = MintPayload::new();
        for (key, value) in iter {
            payload.insert(key, value);
        }
        payload
    }
}

impl Serialize for MintPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Builds a [`MintPayload`] from a data profile and an entity.
pub struct PayloadBuilder;

impl PayloadBuilder {
    /// Maps each profile entry whose source field exists on the entity.
    ///
    /// Entries naming a field the entity does not have are skipped. A missing
    /// profile or entity yields an empty payload; it is up to the caller to
    /// treat that as degraded.
    pub fn build(
        profile: Option<&DataProfileConfig>,
        entity: Option<&dyn FieldAccessor>,
    ) -> MintPayload {
        let (Some(profile), Some(entity)) = (profile, entity) else {
            debug!("No data profile or entity; building empty payload");
            return MintPayload::new();
        };

        let mut payload = MintPayload::new();
        for entry in &profile.entries {
            if entity.has_field(&entry.source_field) {
                payload.insert(entry.key.as_str(), entity.get_string(&entry.source_field));
            } else {
                debug!(
                    profile = %profile.id,
                    source_field = %entry.source_field,
                    "Skipping profile entry; entity has no such field"
                );
            }
        }
        payload
    }

    /// Source fields the profile maps that the entity does not have, in
    /// profile order.
    pub fn missing_source_fields(
        profile: &DataProfileConfig,
        entity: &dyn FieldAccessor,
    ) -> Vec<String> {
        profile
            .entries
            .iter()
            .filter(|entry| !entity.has_field(&entry.source_field))
            .map(|entry| entry.source_field.clone())
            .collect()
    }
}
