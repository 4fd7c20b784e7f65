pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "solrhelper")]
#[command(about = "Inspect Solr schemas and edit document fields", version)]
pub struct Cli {
    /// Solr base URL (overrides SOLRHELPER_SOLR_URL and config.toml)
    #[arg(long, global = true)]
    pub solr_url: Option<String>,

    /// Core name (overrides SOLRHELPER_CORE and config.toml)
    #[arg(long, global = true)]
    pub core: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check that the core answers queries
    TestConnection,
    /// Print fields, dynamic fields, field types and copy rules
    ShowSchema {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// List the searchable fields
    Fields {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show one document by its unique key
    Get {
        id: String,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Substring search within one field
    Search {
        query: String,
        #[arg(long)]
        field: Option<String>,
        #[arg(long, default_value_t = solrhelper::search::DEFAULT_ROWS)]
        rows: usize,
        #[arg(long, default_value_t = 0)]
        start: usize,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Set one field on a document
    SetField {
        id: String,
        field: String,
        /// New value; with --multi, one value per line
        value: String,
        #[arg(long)]
        multi: bool,
    },
    /// Add a field the document does not carry yet
    AddField {
        id: String,
        field: String,
        value: String,
    },
}
