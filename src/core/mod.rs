pub mod document;
pub mod error;

pub use document::{Document, VERSION_FIELD, parse_field_input};
pub use error::{Result, SolrError};
