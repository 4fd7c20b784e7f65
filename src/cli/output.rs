use clap::ValueEnum;
use serde_json::json;
use solrhelper::schema::{FieldDef, FieldSummary, SchemaModel};
use solrhelper::{Document, SearchResults};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// JSON output.
    Json,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    field_type: String,
    #[tabled(rename = "Indexed")]
    indexed: &'static str,
    #[tabled(rename = "Stored")]
    stored: &'static str,
    #[tabled(rename = "Multi")]
    multi_valued: &'static str,
    #[tabled(rename = "Required")]
    required: &'static str,
}

#[derive(Tabled)]
struct FieldTypeRow {
    #[tabled(rename = "Type")]
    name: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Analyzer")]
    analyzer: &'static str,
}

#[derive(Tabled)]
struct IndexedFieldRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    field_type: String,
    #[tabled(rename = "Multi")]
    multi_valued: &'static str,
    #[tabled(rename = "Dynamic")]
    dynamic: &'static str,
}

#[derive(Tabled)]
struct ValueRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct HitRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Matches")]
    snippets: String,
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn field_row(def: &FieldDef) -> FieldRow {
    FieldRow {
        name: def.name.clone(),
        field_type: def.field_type.clone(),
        indexed: yes_no(def.indexed),
        stored: yes_no(def.stored),
        multi_valued: yes_no(def.multi_valued),
        required: yes_no(def.required),
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("failed to render JSON: {e}"),
    }
}

/// Print a schema.
pub fn print_schema(schema: &SchemaModel, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&schema.to_json()),
        OutputFormat::Table => {
            println!("\nSchema for core: {}", schema.core());

            println!("\nFields:");
            let rows: Vec<FieldRow> = schema
                .sorted_static_fields()
                .into_iter()
                .map(field_row)
                .collect();
            println!("{}", Table::new(&rows).with(Style::rounded()));

            if !schema.dynamic_fields().is_empty() {
                println!("\nDynamic fields:");
                let rows: Vec<FieldRow> = schema
                    .dynamic_fields()
                    .iter()
                    .map(|d| field_row(&d.def))
                    .collect();
                println!("{}", Table::new(&rows).with(Style::rounded()));
            }

            if !schema.field_types().is_empty() {
                println!("\nField types:");
                let rows: Vec<FieldTypeRow> = schema
                    .field_types()
                    .iter()
                    .map(|t| FieldTypeRow {
                        name: t.name.clone(),
                        class: t.class.clone(),
                        analyzer: yes_no(t.has_analyzer),
                    })
                    .collect();
                println!("{}", Table::new(&rows).with(Style::rounded()));
            }

            if !schema.copy_fields().is_empty() {
                println!("\nCopy fields:");
                for cf in schema.copy_fields() {
                    println!("  {} -> {}", cf.source, cf.dest);
                }
            }

            println!("\nUnique key: {}", schema.unique_key_field());
        }
    }
}

/// Print the searchable fields.
pub fn print_indexed_fields(fields: &[FieldSummary], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&json!(fields)),
        OutputFormat::Table => {
            let rows: Vec<IndexedFieldRow> = fields
                .iter()
                .map(|f| IndexedFieldRow {
                    name: f.name.clone(),
                    field_type: f.field_type.clone(),
                    multi_valued: yes_no(f.multi_valued),
                    dynamic: yes_no(f.dynamic),
                })
                .collect();
            println!("{}", Table::new(&rows).with(Style::rounded()));
        }
    }
}

/// Print one document.
pub fn print_document(doc: &Document, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&json!(doc)),
        OutputFormat::Table => {
            let rows: Vec<ValueRow> = doc
                .field_names()
                .map(|name| ValueRow {
                    field: name.to_string(),
                    value: doc.display_value(name).unwrap_or_default(),
                })
                .collect();
            println!("{}", Table::new(&rows).with(Style::rounded()));
        }
    }
}

/// Print search hits with their highlight snippets.
pub fn print_search_results(results: &SearchResults, unique_key_field: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&json!(results)),
        OutputFormat::Table => {
            if results.is_empty() {
                println!("No results found for {}.", results.query);
                return;
            }

            println!("{} results for {}", results.num_found, results.query);
            let rows: Vec<HitRow> = results
                .docs
                .iter()
                .map(|doc| {
                    let id = doc
                        .display_value(unique_key_field)
                        .unwrap_or_else(|| "N/A".to_string());
                    let snippets = results
                        .snippets_for(&id)
                        .into_iter()
                        .take(2)
                        .map(|(field, snippet)| format!("[{field}] {snippet}"))
                        .collect::<Vec<_>>()
                        .join("\n");
                    HitRow { id, snippets }
                })
                .collect();
            println!("{}", Table::new(&rows).with(Style::rounded()));
        }
    }
}
