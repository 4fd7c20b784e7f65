//! Schema model and field resolution
//!
//! - `model.rs` - normalized schema built from the schema API response
//! - `pattern.rs` - compiled glob matchers for dynamic field names
//! - `resolver.rs` - field definition lookup and field listings

mod model;
mod pattern;
mod resolver;

pub use model::{
    CopyField, DEFAULT_UNIQUE_KEY, DynamicField, FieldDef, FieldTypeDef, SchemaBuilder,
    SchemaModel,
};
pub use pattern::GlobPattern;
pub use resolver::{
    DisplayField, FieldSummary, UNKNOWN_FIELD_TYPE, display_fields, list_indexed_fields,
    resolve_field_definition,
};
