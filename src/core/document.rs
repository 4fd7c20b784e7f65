use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Optimistic-lock token Solr attaches to every stored document.
pub const VERSION_FIELD: &str = "_version_";

/// A Solr document as returned by `select`.
///
/// Values are either scalars or arrays of scalars (multi-valued fields).
/// Field order follows the server response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Set a field, returning the previous value
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Remove a field, keeping the order of the remaining ones
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the current value of `field` is a sequence
    pub fn is_multi_valued(&self, field: &str) -> bool {
        matches!(self.0.get(field), Some(Value::Array(_)))
    }

    pub fn version(&self) -> Option<&Value> {
        self.0.get(VERSION_FIELD)
    }

    /// Field value rendered as plain text, one line per entry for arrays.
    pub fn display_value(&self, field: &str) -> Option<String> {
        self.0.get(field).map(render_value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc.0)
    }
}

impl TryFrom<Value> for Document {
    type Error = crate::core::SolrError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(crate::core::SolrError::InvalidResponse(format!(
                "expected a document object, got {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// Turn raw form input into a field value.
///
/// Multi-valued fields take one value per line; everything else is kept
/// verbatim as a single string.
pub fn parse_field_input(raw: &str, multi_valued: bool) -> Value {
    if multi_valued {
        Value::Array(
            raw.lines()
                .map(|line| Value::String(line.to_string()))
                .collect(),
        )
    } else {
        Value::String(raw.to_string())
    }
}
