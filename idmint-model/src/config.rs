//! Configuration records consumed by the minting pipeline.
//!
//! Both records are owned by an external configuration store and are
//! read-only to the core. Field names follow the stored record layout:
//! `entity`, `bundle`, `field`, `data_profile` and `data`.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Selects the field that receives a minted identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierConfig {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "entity", default)]
    pub entity_type: String,
    #[serde(default)]
    pub bundle: String,
    /// Target field name on the entity.
    pub field: String,
    /// Id of the paired data profile. Defaults to this record's own id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_profile: Option<String>,
}

impl IdentifierConfig {
    /// Id of the data profile this identifier is minted with.
    pub fn data_profile_ref(&self) -> &str {
        self.data_profile.as_deref().unwrap_or(&self.id)
    }

    /// Whether an entity of `entity_type`/`bundle` may receive this identifier.
    /// An empty configured entity type or bundle matches anything.
    pub fn applies_to(&self, entity_type: &str, bundle: &str) -> bool {
        (self.entity_type.is_empty() || self.entity_type == entity_type)
            && (self.bundle.is_empty() || self.bundle == bundle)
    }
}

/// One mapping from an entity field to a payload key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    /// Entity field supplying the value.
    pub source_field: String,
    /// Payload key exposed to the identifier service.
    pub key: String,
}

impl ProfileEntry {
    pub fn new(source_field: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            source_field: source_field.into(),
            key: key.into(),
        }
    }

    fn from_value(value: Value) -> Option<Self> {
        match serde_json::from_value::<ProfileEntry>(value) {
            Ok(entry) if !entry.source_field.is_empty() && !entry.key.is_empty() => Some(entry),
            Ok(_) => {
                debug!("Skipping data profile entry with empty source_field or key");
                None
            }
            Err(e) => {
                debug!("Skipping malformed data profile entry: {e}");
                None
            }
        }
    }
}

/// Declarative mapping from entity fields to service payload keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataProfileConfig {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "entity", default)]
    pub entity_type: String,
    #[serde(default)]
    pub bundle: String,
    #[serde(default)]
    pub label: String,
    /// Mapping entries in configured order.
    ///
    /// Stored as `data`, either a list or an index-keyed map. Map entries
    /// whose index is not numeric are dropped, as are entries missing
    /// `source_field` or `key`. A numeric index is any decimal number,
    /// optionally signed, fractional or with an exponent, and may be
    /// surrounded by whitespace (`"1"`, `" 2"`, `"1.5"`, `"1e2"`).
    #[serde(rename = "data", default, deserialize_with = "deserialize_entries")]
    pub entries: Vec<ProfileEntry>,
}

impl DataProfileConfig {
    pub fn new(id: impl Into<String>, entries: Vec<ProfileEntry>) -> Self {
        Self {
            id: id.into(),
            entries,
            ..Default::default()
        }
    }
}

fn deserialize_entries<'de, D>(deserializer: D) -> Result<Vec<ProfileEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(EntriesVisitor)
}

struct EntriesVisitor;

impl<'de> Visitor<'de> for EntriesVisitor {
    type Value = Vec<ProfileEntry>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list or an index-keyed map of profile entries")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut entries = Vec::new();
        while let Some(value) = seq.next_element::<Value>()? {
            entries.extend(ProfileEntry::from_value(value));
        }
        Ok(entries)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::new();
        while let Some((index, value)) = map.next_entry::<String, Value>()? {
            if !is_numeric_index(&index) {
                debug!(index = %index, "Skipping data profile entry with non-numeric index");
                continue;
            }
            entries.extend(ProfileEntry::from_value(value));
        }
        Ok(entries)
    }
}

fn is_numeric_index(index: &str) -> bool {
    let index = index.trim();
    let unsigned = index.trim_start_matches(['+', '-']);
    unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && index.parse::<f64>().is_ok()
}
