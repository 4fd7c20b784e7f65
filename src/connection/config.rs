use std::time::Duration;
use tracing::warn;
use url::Url;

pub const DEFAULT_SOLR_URL: &str = "http://localhost:8983";
pub const DEFAULT_CORE: &str = "testing";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Solr connection configuration
///
/// Addresses a single core: `{solr_url}/{core}` where `solr_url` always
/// ends in `/solr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Base URL of the Solr web app, e.g. `http://localhost:8983/solr`
    pub solr_url: String,

    /// Core (collection) name
    pub core: String,

    /// Timeout applied to every HTTP request
    pub timeout: Duration,
}

impl ConnectionConfig {
    /// Create a new configuration. A missing `/solr` suffix is appended.
    pub fn new(solr_url: &str, core: &str) -> Self {
        Self {
            solr_url: normalize_solr_url(solr_url),
            core: core.trim_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the core
    pub fn core(mut self, core: &str) -> Self {
        self.core = core.trim_matches('/').to_string();
        self
    }

    /// Parse from a full core URL
    ///
    /// Format: "http://host:port/solr/core"
    ///
    /// # Examples
    ///
    /// ```
    /// use solrhelper::ConnectionConfig;
    ///
    /// let config = ConnectionConfig::from_url("http://localhost:8983/solr/books").unwrap();
    /// assert_eq!(config.core, "books");
    /// assert_eq!(config.solr_url, "http://localhost:8983/solr");
    /// ```
    pub fn from_url(url: &str) -> Result<Self, String> {
        let parsed = Url::parse(url).map_err(|e| format!("Invalid URL '{}': {}", url, e))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err("URL must start with 'http://' or 'https://'".to_string());
        }

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let Some((core, base)) = segments.split_last() else {
            return Err("URL must end with the core name".to_string());
        };
        if base.last() != Some(&"solr") {
            return Err("URL must have the form http://host:port/solr/<core>".to_string());
        }

        let mut root = parsed.clone();
        root.set_path(&base.join("/"));
        root.set_query(None);

        Ok(Self::new(root.as_str(), core))
    }

    /// Full URL of the core
    pub fn core_url(&self) -> String {
        format!("{}/{}", self.solr_url, self.core)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.core.is_empty() {
            return Err("Core cannot be empty".to_string());
        }

        if self.core.contains('/') {
            return Err(format!("Core name '{}' must not contain '/'", self.core));
        }

        let url = Url::parse(&self.solr_url)
            .map_err(|e| format!("Invalid Solr URL '{}': {}", self.solr_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("Unsupported URL scheme '{}'", url.scheme()));
        }

        if self.timeout.is_zero() {
            return Err("timeout must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SOLR_URL, DEFAULT_CORE)
    }
}

fn normalize_solr_url(solr_url: &str) -> String {
    let trimmed = solr_url.trim().trim_end_matches('/');
    if trimmed.ends_with("/solr") {
        trimmed.to_string()
    } else {
        warn!(
            "solr_url '{}' does not end with '/solr', appending it",
            solr_url
        );
        format!("{}/solr", trimmed)
    }
}
