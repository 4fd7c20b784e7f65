//! Layered connection settings.
//!
//! Precedence: CLI > environment > `config.toml` > built-in defaults.
//! Config files are only read when CLI and environment leave a value unset.

use super::config::{ConnectionConfig, DEFAULT_CORE, DEFAULT_SOLR_URL};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ENV_SOLR_URL: &str = "SOLRHELPER_SOLR_URL";
pub const ENV_CORE: &str = "SOLRHELPER_CORE";

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub solr_url: Option<String>,
    pub core: Option<String>,
}

/// Shape of `config.toml`
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    solr_url: Option<String>,
    core: Option<String>,
}

/// `./config.toml` first, then `~/.solrhelper/config.toml`
pub fn default_config_paths(cwd: &Path, home_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join("config.toml")];
    if let Some(home) = home_dir {
        paths.push(home.join(".solrhelper").join("config.toml"));
    }
    paths
}

/// Resolve `(solr_url, core)` from all sources. The URL comes back without
/// a trailing slash; the `/solr` suffix is added later by
/// [`ConnectionConfig::new`].
pub fn resolve_settings<S: std::hash::BuildHasher>(
    cli: &CliOverrides,
    env: &HashMap<String, String, S>,
    config_paths: &[PathBuf],
) -> (String, String) {
    let non_empty = |v: &String| !v.trim().is_empty();

    let mut solr_url = cli.solr_url.clone().filter(non_empty);
    let mut core = cli.core.clone().filter(non_empty);

    if solr_url.is_none() {
        solr_url = env.get(ENV_SOLR_URL).cloned().filter(non_empty);
    }
    if core.is_none() {
        core = env.get(ENV_CORE).cloned().filter(non_empty);
    }

    if solr_url.is_none() || core.is_none() {
        if let Some(file) = first_readable_config(config_paths) {
            if solr_url.is_none() {
                solr_url = file.solr_url.filter(non_empty);
            }
            if core.is_none() {
                core = file.core.filter(non_empty);
            }
        }
    }

    let solr_url = solr_url.unwrap_or_else(|| DEFAULT_SOLR_URL.to_string());
    let core = core.unwrap_or_else(|| DEFAULT_CORE.to_string());

    (solr_url.trim_end_matches('/').to_string(), core)
}

/// Build a [`ConnectionConfig`] from all sources
pub fn load_connection_config<S: std::hash::BuildHasher>(
    cli: &CliOverrides,
    env: &HashMap<String, String, S>,
    config_paths: &[PathBuf],
) -> ConnectionConfig {
    let (solr_url, core) = resolve_settings(cli, env, config_paths);
    ConnectionConfig::new(&solr_url, &core)
}

fn first_readable_config(paths: &[PathBuf]) -> Option<FileConfig> {
    for path in paths {
        if !path.exists() {
            continue;
        }
        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| toml::from_str::<FileConfig>(&content).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => {
                debug!("Loaded settings from {}", path.display());
                return Some(config);
            }
            Err(e) => warn!("Ignoring unreadable config file {}: {}", path.display(), e),
        }
    }
    None
}
