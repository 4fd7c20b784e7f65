use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolrError {
    #[error("Connection error: {0}")]
    Connectivity(String),

    #[error("Solr returned HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("No document with {key_field} '{doc_id}' found")]
    NotFound { key_field: String, doc_id: String },

    #[error("Could not read core configuration: {0}")]
    ConfigProbe(String),

    #[error("Update of field '{field}' on document '{doc_id}' failed: {source}")]
    Update {
        field: String,
        doc_id: String,
        #[source]
        source: Box<SolrError>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SolrError>;

impl SolrError {
    /// True for faults of the transport itself (refused, timed out, DNS).
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for SolrError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Server {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Connectivity(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SolrError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
