use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A fieldable content entity.
///
/// Fields are stored as named JSON values. A field that is present with a
/// `null` value still exists on the entity; it simply renders as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub entity_type: String,
    #[serde(default)]
    pub bundle: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Entity {
    /// Creates an entity with no fields.
    pub fn new(
        id: impl Into<String>,
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            bundle: bundle.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field assignment.
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Whether `name` is part of this entity's field set.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Raw JSON value of a field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Extract a field only if it holds a JSON string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    /// String rendering of a field.
    ///
    /// Multi-valued fields join their items with `", "`; compound values
    /// join their properties with a single space. Missing fields render as
    /// an empty string.
    pub fn field_string(&self, name: &str) -> String {
        self.fields.get(name).map(render).unwrap_or_default()
    }

    /// Replace a field value.
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(", "),
        Value::Object(props) => props.values().map(render).collect::<Vec<_>>().join(" "),
    }
}
