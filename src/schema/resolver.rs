use super::model::{FieldDef, SchemaModel};
use crate::core::Document;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

/// Type reported for fields that exist only in document data
pub const UNKNOWN_FIELD_TYPE: &str = "unknown";

/// Entry of a searchable-field picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub multi_valued: bool,
    pub dynamic: bool,
}

/// A field row of a record view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayField {
    pub definition: FieldDef,
    pub value: Option<Value>,
    pub has_value: bool,
}

/// Resolve the effective definition of `field_name`.
///
/// Lookup order: static field, then the first dynamic pattern that matches
/// in declaration order, then a synthetic definition for fields seen only
/// in data. First match wins even when a later pattern is more specific;
/// Solr itself prefers the longest pattern, so schemas with overlapping
/// patterns can resolve differently here than on the server.
pub fn resolve_field_definition(
    field_name: &str,
    schema: &SchemaModel,
    doc: Option<&Document>,
) -> FieldDef {
    if let Some(def) = schema.static_field(field_name) {
        return def.clone();
    }

    if let Some(dynamic) = schema.dynamic_fields().iter().find(|d| d.matches(field_name)) {
        debug!(
            "Dynamic field detected: {} -> {}",
            field_name,
            dynamic.pattern()
        );
        let mut def = dynamic.def.clone();
        def.name = field_name.to_string();
        def.is_dynamic = true;
        return def;
    }

    debug!("Field only present in document: {}", field_name);
    FieldDef {
        name: field_name.to_string(),
        field_type: UNKNOWN_FIELD_TYPE.to_string(),
        indexed: false,
        stored: true,
        multi_valued: doc.is_some_and(|d| d.is_multi_valued(field_name)),
        required: false,
        is_dynamic: false,
    }
}

/// All indexed static and dynamic fields, sorted by name.
///
/// Dynamic entries carry their pattern as name. Equal names are ordered by
/// the dynamic flag, so a static field precedes a dynamic pattern spelled
/// the same way.
pub fn list_indexed_fields(schema: &SchemaModel) -> Vec<FieldSummary> {
    let static_fields = schema.static_fields().filter(|f| f.indexed).map(|f| FieldSummary {
        name: f.name.clone(),
        field_type: f.field_type.clone(),
        multi_valued: f.multi_valued,
        dynamic: false,
    });

    let dynamic_fields = schema
        .dynamic_fields()
        .iter()
        .map(|d| &d.def)
        .filter(|f| f.indexed)
        .map(|f| FieldSummary {
            name: f.name.clone(),
            field_type: f.field_type.clone(),
            multi_valued: f.multi_valued,
            dynamic: true,
        });

    let mut fields: Vec<FieldSummary> = static_fields.chain(dynamic_fields).collect();
    // Name first, then static before dynamic on equal names
    fields.sort_by(|a, b| a.name.cmp(&b.name).then(a.dynamic.cmp(&b.dynamic)));

    debug!("Found {} indexed fields", fields.len());
    fields
}

/// Union of the document's fields and the declared static fields, sorted
/// by name, each with its resolved definition and current value.
pub fn display_fields(doc: &Document, schema: &SchemaModel) -> Vec<DisplayField> {
    let names: BTreeSet<&str> = doc
        .field_names()
        .chain(schema.static_fields().map(|f| f.name.as_str()))
        .collect();

    let fields: Vec<DisplayField> = names
        .into_iter()
        .map(|name| DisplayField {
            definition: resolve_field_definition(name, schema, Some(doc)),
            value: doc.get(name).cloned(),
            has_value: doc.contains_field(name),
        })
        .collect();

    debug!("Built {} display fields", fields.len());
    fields
}

impl SchemaModel {
    pub fn resolve(&self, field_name: &str, doc: Option<&Document>) -> FieldDef {
        resolve_field_definition(field_name, self, doc)
    }

    pub fn indexed_fields(&self) -> Vec<FieldSummary> {
        list_indexed_fields(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> SchemaModel {
        SchemaModel::builder("books")
            .unique_key("id")
            .field(FieldDef::new("id", "string").required(true))
            .field(FieldDef::new("title", "text_general"))
            .field(FieldDef::new("internal", "string").indexed(false))
            .dynamic_field(FieldDef::new("*_ss", "strings").multi_valued(true))
            .dynamic_field(FieldDef::new("*_s", "string"))
            .dynamic_field(FieldDef::new("*_bin", "binary").indexed(false).stored(false))
            .copy_field("title", "title_s")
            .build()
            .unwrap()
    }

    fn doc() -> Document {
        serde_json::from_value(json!({
            "id": "1",
            "title": "Old",
            "tag_ss": ["a", "b"],
            "legacy": ["x"],
            "note": "plain",
            "_version_": 123
        }))
        .unwrap()
    }

    #[test]
    fn test_static_field_returned_unchanged() {
        let schema = schema();
        let def = resolve_field_definition("title", &schema, None);
        assert_eq!(&def, schema.static_field("title").unwrap());
        assert!(!def.is_dynamic);
    }

    #[test]
    fn test_dynamic_match_renames_and_inherits() {
        let schema = schema();
        let def = resolve_field_definition("tag_ss", &schema, None);

        assert_eq!(def.name, "tag_ss");
        assert_eq!(def.field_type, "strings");
        assert!(def.multi_valued);
        assert!(def.stored);
        assert!(def.is_dynamic);
    }

    #[test]
    fn test_unknown_field_fallback() {
        let schema = schema();
        let doc = doc();

        let legacy = resolve_field_definition("legacy", &schema, Some(&doc));
        assert_eq!(legacy.field_type, UNKNOWN_FIELD_TYPE);
        assert!(legacy.stored);
        assert!(legacy.multi_valued);
        assert!(!legacy.is_dynamic);

        let note = resolve_field_definition("note", &schema, Some(&doc));
        assert!(!note.multi_valued);

        let without_doc = resolve_field_definition("legacy", &schema, None);
        assert!(!without_doc.multi_valued);
        assert!(without_doc.stored);
    }

    #[test]
    fn test_indexed_fields_sorted_and_filtered() {
        let fields = list_indexed_fields(&schema());
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, vec!["*_s", "*_ss", "id", "title"]);
        assert!(fields[0].dynamic);
        assert!(!fields[2].dynamic);
        assert!(fields.iter().all(|f| f.name != "internal" && f.name != "*_bin"));
    }

    #[test]
    fn test_indexed_fields_deterministic() {
        let schema = schema();
        assert_eq!(list_indexed_fields(&schema), list_indexed_fields(&schema));
    }

    #[test]
    fn test_static_precedes_dynamic_with_same_name() {
        let schema = SchemaModel::builder("books")
            .unique_key("id")
            .field(FieldDef::new("id", "string"))
            .dynamic_field(FieldDef::new("id", "string"))
            .build()
            .unwrap();

        let fields = list_indexed_fields(&schema);
        assert_eq!(fields.len(), 2);
        assert!(!fields[0].dynamic);
        assert!(fields[1].dynamic);
    }

    #[test]
    fn test_display_fields_union() {
        let schema = schema();
        let doc = doc();
        let fields = display_fields(&doc, &schema);
        let names: Vec<&str> = fields.iter().map(|f| f.definition.name.as_str()).collect();

        assert_eq!(
            names,
            vec!["_version_", "id", "internal", "legacy", "note", "tag_ss", "title"]
        );

        let internal = fields.iter().find(|f| f.definition.name == "internal").unwrap();
        assert!(!internal.has_value);
        assert!(internal.value.is_none());

        let tags = fields.iter().find(|f| f.definition.name == "tag_ss").unwrap();
        assert!(tags.has_value);
        assert!(tags.definition.is_dynamic);
        assert_eq!(tags.value, Some(json!(["a", "b"])));
    }
}
