use super::output::{print_document, print_indexed_fields, print_schema, print_search_results};
use super::{Cli, Command};
use anyhow::{Context, Result, bail};
use solrhelper::connection::sources::default_config_paths;
use solrhelper::{
    CliOverrides, ConnectionConfig, SearchRequest, Session, SolrConnection, load_connection_config,
};
use std::collections::HashMap;
use std::path::PathBuf;

pub async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    match cli.command {
        Command::TestConnection => {
            let connection = SolrConnection::new(config)?;
            if connection.check_connection().await {
                println!("Connected to {}", connection.core_url());
            } else {
                bail!("could not reach {}", connection.core_url());
            }
        }
        Command::ShowSchema { format } => {
            let session = open(config).await?;
            print_schema(session.schema(), format);
        }
        Command::Fields { format } => {
            let session = open(config).await?;
            print_indexed_fields(session.indexed_fields(), format);
        }
        Command::Get { id, format } => {
            let session = open(config).await?;
            match session.find_document(&id).await? {
                Some(doc) => print_document(&doc, format),
                None => bail!(
                    "No document with {} '{}' found",
                    session.unique_key_field(),
                    id
                ),
            }
        }
        Command::Search {
            query,
            field,
            rows,
            start,
            format,
        } => {
            let session = open(config).await?;
            let mut request = SearchRequest::new(&query).rows(rows).start(start);
            if let Some(field) = field.as_deref() {
                request = request.field(field);
            }
            let results = session.search(&request).await?;
            print_search_results(&results, session.unique_key_field(), format);
        }
        Command::SetField {
            id,
            field,
            value,
            multi,
        } => {
            let session = open(config).await?;
            let view = session.edit_view(&id, &field).await?;
            if let Some(warning) = view.warning {
                eprintln!("warning: {warning}");
            }
            let outcome = session.edit_field(&id, &field, &value, multi).await?;
            println!(
                "Field '{}' updated using {} update",
                field, outcome.strategy
            );
            if let Some(doc) = outcome.document {
                if let Some(current) = doc.display_value(&field) {
                    println!("{field} = {current}");
                }
            }
        }
        Command::AddField { id, field, value } => {
            let session = open(config).await?;
            session.add_field(&id, &field, &value).await?;
            println!("Field '{}' added to document {}", field.trim(), id);
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<ConnectionConfig> {
    let overrides = CliOverrides {
        solr_url: cli.solr_url.clone(),
        core: cli.core.clone(),
    };
    let env: HashMap<String, String> = std::env::vars().collect();
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let paths = default_config_paths(&cwd, home.as_deref());

    Ok(load_connection_config(&overrides, &env, &paths))
}

async fn open(config: ConnectionConfig) -> Result<Session> {
    let core_url = config.core_url();
    Session::open(config)
        .await
        .with_context(|| format!("failed to open core at {core_url}"))
}
