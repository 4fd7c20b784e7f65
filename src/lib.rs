//! # SolrHelper
//!
//! Schema-aware inspection and field editing for Solr cores.
//!
//! A field edit goes through three steps: resolve the field against the
//! schema (static, dynamic pattern, or data-only), pick an update strategy
//! from the core's update-log capability, then submit either a partial
//! `set` update or a cleaned full document.
//!
//! ```no_run
//! use solrhelper::{ConnectionConfig, Session};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::open(ConnectionConfig::new("http://localhost:8983", "books")).await?;
//!
//! let outcome = session.edit_field("42", "title", "New title", false).await?;
//! println!("updated with {} strategy", outcome.strategy);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod core;
pub mod connection;
pub mod schema;
pub mod update;
pub mod search;
pub mod facade;

// Re-export main types for convenience
pub use crate::core::{Document, Result, SolrError, VERSION_FIELD};
pub use crate::facade::Session;

// Re-export connection API
pub use crate::connection::{
    SolrConnection,
    config::ConnectionConfig,
    sources::{CliOverrides, load_connection_config},
};

// Re-export the field reconciliation core
pub use crate::schema::{
    CopyField, FieldDef, FieldSummary, SchemaModel, list_indexed_fields, resolve_field_definition,
};
pub use crate::search::{SearchRequest, SearchResults};
pub use crate::update::{UpdateIntent, UpdateStrategy};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
