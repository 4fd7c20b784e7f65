use super::pattern::GlobPattern;
use crate::core::{Result, SolrError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;

/// Unique key assumed when the schema does not declare one
pub const DEFAULT_UNIQUE_KEY: &str = "id";

/// Effective definition of a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub indexed: bool,
    pub stored: bool,
    pub multi_valued: bool,
    pub required: bool,
    #[serde(rename = "dynamic")]
    pub is_dynamic: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            indexed: true,
            stored: true,
            multi_valued: false,
            required: false,
            is_dynamic: false,
        }
    }

    pub fn multi_valued(mut self, multi_valued: bool) -> Self {
        self.multi_valued = multi_valued;
        self
    }

    pub fn stored(mut self, stored: bool) -> Self {
        self.stored = stored;
        self
    }

    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// A dynamic field declaration: the definition template plus its compiled
/// name pattern.
#[derive(Debug, Clone)]
pub struct DynamicField {
    pub def: FieldDef,
    pattern: GlobPattern,
}

impl DynamicField {
    pub fn new(def: FieldDef) -> Result<Self> {
        let pattern = GlobPattern::compile(&def.name)?;
        Ok(Self { def, pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn matches(&self, field_name: &str) -> bool {
        self.pattern.matches(field_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyField {
    pub source: String,
    pub dest: String,
}

impl CopyField {
    pub fn new(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTypeDef {
    pub name: String,
    pub class: String,
    pub has_analyzer: bool,
}

// Wire shapes of `GET {core}/schema?wt=json`

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchema {
    unique_key: Option<String>,
    #[serde(default)]
    fields: Vec<RawField>,
    #[serde(default)]
    field_types: Vec<RawFieldType>,
    #[serde(default)]
    dynamic_fields: Vec<RawField>,
    #[serde(default)]
    copy_fields: Vec<CopyField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    field_type: Option<String>,
    indexed: Option<bool>,
    stored: Option<bool>,
    multi_valued: Option<bool>,
    required: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldType {
    name: String,
    #[serde(default)]
    class: String,
    analyzer: Option<Value>,
    index_analyzer: Option<Value>,
    query_analyzer: Option<Value>,
}

impl RawField {
    fn into_def(self, is_dynamic: bool) -> FieldDef {
        FieldDef {
            name: self.name,
            field_type: self.field_type.unwrap_or_else(|| "unknown".to_string()),
            indexed: self.indexed.unwrap_or(true),
            stored: self.stored.unwrap_or(true),
            multi_valued: self.multi_valued.unwrap_or(false),
            required: self.required.unwrap_or(false),
            is_dynamic,
        }
    }
}

/// Normalized, read-only view of a core's schema.
///
/// Built once per connection; dynamic field order is the declaration order
/// and is significant for resolution.
#[derive(Debug, Clone)]
pub struct SchemaModel {
    core: String,
    unique_key: Option<String>,
    static_fields: HashMap<String, FieldDef>,
    dynamic_fields: Vec<DynamicField>,
    copy_fields: Vec<CopyField>,
    field_types: Vec<FieldTypeDef>,
}

impl SchemaModel {
    /// Build the model from a schema API response.
    ///
    /// Accepts the full response (`{"schema": {...}}`) or the bare schema
    /// object.
    pub fn from_response(core: &str, body: &Value) -> Result<Self> {
        let schema = body.get("schema").unwrap_or(body);
        let raw: RawSchema = serde_json::from_value(schema.clone())
            .map_err(|e| SolrError::InvalidSchema(e.to_string()))?;
        Self::from_raw(core, raw)
    }

    fn from_raw(core: &str, raw: RawSchema) -> Result<Self> {
        let static_fields: HashMap<String, FieldDef> = raw
            .fields
            .into_iter()
            .map(|f| (f.name.clone(), f.into_def(false)))
            .collect();

        let dynamic_fields = raw
            .dynamic_fields
            .into_iter()
            .map(|f| DynamicField::new(f.into_def(true)))
            .collect::<Result<Vec<_>>>()?;

        let field_types = raw
            .field_types
            .into_iter()
            .map(|t| FieldTypeDef {
                has_analyzer: t.analyzer.is_some()
                    || t.index_analyzer.is_some()
                    || t.query_analyzer.is_some(),
                name: t.name,
                class: t.class,
            })
            .collect();

        let model = Self {
            core: core.to_string(),
            unique_key: raw.unique_key,
            static_fields,
            dynamic_fields,
            copy_fields: raw.copy_fields,
            field_types,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn builder(core: &str) -> SchemaBuilder {
        SchemaBuilder::new(core)
    }

    fn validate(&self) -> Result<()> {
        if let Some(key) = &self.unique_key {
            if !self.static_fields.contains_key(key) {
                return Err(SolrError::InvalidSchema(format!(
                    "uniqueKey '{}' is not a declared field",
                    key
                )));
            }
        }
        Ok(())
    }

    pub fn core(&self) -> &str {
        &self.core
    }

    /// Declared unique key, if any
    pub fn unique_key(&self) -> Option<&str> {
        self.unique_key.as_deref()
    }

    /// Unique key used for lookups, falling back to `id`
    pub fn unique_key_field(&self) -> &str {
        self.unique_key.as_deref().unwrap_or(DEFAULT_UNIQUE_KEY)
    }

    pub fn static_field(&self, name: &str) -> Option<&FieldDef> {
        self.static_fields.get(name)
    }

    pub fn static_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.static_fields.values()
    }

    /// Static fields ordered by name
    pub fn sorted_static_fields(&self) -> Vec<&FieldDef> {
        let mut fields: Vec<&FieldDef> = self.static_fields.values().collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        fields
    }

    pub fn dynamic_fields(&self) -> &[DynamicField] {
        &self.dynamic_fields
    }

    pub fn copy_fields(&self) -> &[CopyField] {
        &self.copy_fields
    }

    pub fn field_types(&self) -> &[FieldTypeDef] {
        &self.field_types
    }

    /// JSON view with the same top-level keys the schema command prints
    pub fn to_json(&self) -> Value {
        let dynamic: Vec<&FieldDef> = self.dynamic_fields.iter().map(|d| &d.def).collect();
        json!({
            "core": self.core,
            "unique_key": self.unique_key,
            "fields": self.sorted_static_fields(),
            "field_types": self.field_types,
            "dynamic_fields": dynamic,
            "copy_fields": self.copy_fields,
        })
    }
}

/// Programmatic schema construction, mostly for callers that already hold
/// field metadata and for tests.
pub struct SchemaBuilder {
    core: String,
    unique_key: Option<String>,
    fields: Vec<FieldDef>,
    dynamic_fields: Vec<FieldDef>,
    copy_fields: Vec<CopyField>,
}

impl SchemaBuilder {
    fn new(core: &str) -> Self {
        Self {
            core: core.to_string(),
            unique_key: None,
            fields: Vec::new(),
            dynamic_fields: Vec::new(),
            copy_fields: Vec::new(),
        }
    }

    pub fn unique_key(mut self, key: &str) -> Self {
        self.unique_key = Some(key.to_string());
        self
    }

    pub fn field(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    pub fn dynamic_field(mut self, mut def: FieldDef) -> Self {
        def.is_dynamic = true;
        self.dynamic_fields.push(def);
        self
    }

    pub fn copy_field(mut self, source: &str, dest: &str) -> Self {
        self.copy_fields.push(CopyField::new(source, dest));
        self
    }

    pub fn build(self) -> Result<SchemaModel> {
        let model = SchemaModel {
            core: self.core,
            unique_key: self.unique_key,
            static_fields: self
                .fields
                .into_iter()
                .map(|mut f| {
                    f.is_dynamic = false;
                    (f.name.clone(), f)
                })
                .collect(),
            dynamic_fields: self
                .dynamic_fields
                .into_iter()
                .map(DynamicField::new)
                .collect::<Result<Vec<_>>>()?,
            copy_fields: self.copy_fields,
            field_types: Vec::new(),
        };
        model.validate()?;
        Ok(model)
    }
}
