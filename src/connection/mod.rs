pub mod config;
pub mod sources;

use crate::core::{Document, Result, SolrError};
use crate::schema::SchemaModel;
use crate::search::{SearchRequest, SearchResults, SelectResponse, id_query};
use crate::update::{UpdateLogStatus, update_log_enabled};
use config::ConnectionConfig;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Handle to a single Solr core
///
/// Holds the HTTP client and the per-connection memo of the update-log
/// probe. Every call goes straight to the server: a fixed timeout, no
/// retries. Create a new connection to pick up server-side config changes.
pub struct SolrConnection {
    config: ConnectionConfig,
    core_url: String,
    http: Client,
    update_log: UpdateLogStatus,
}

impl SolrConnection {
    /// Create a connection. Does not contact the server.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate().map_err(SolrError::Config)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SolrError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let core_url = config.core_url();
        info!("Solr client initialized for core URL '{}'", core_url);

        Ok(Self {
            config,
            core_url,
            http,
            update_log: UpdateLogStatus::new(),
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn core_url(&self) -> &str {
        &self.core_url
    }

    pub fn core_name(&self) -> &str {
        &self.config.core
    }

    /// Whether the core answers a zero-row match-all query.
    ///
    /// Failures are logged and reported as `false`.
    pub async fn check_connection(&self) -> bool {
        info!("Checking Solr connection at {}", self.core_url);

        let request = SearchRequest::match_all().rows(0).highlight(false);
        match self.select(&request).await {
            Ok(_) => {
                info!("Connection to Solr core established");
                true
            }
            Err(e) => {
                error!("Error connecting to Solr core: {}", e);
                false
            }
        }
    }

    /// Fetch and normalize the core's schema
    pub async fn get_schema(&self) -> Result<SchemaModel> {
        let body = self
            .get_json("schema", &[])
            .await
            .inspect_err(|e| error!("Error fetching schema: {}", e))?;
        SchemaModel::from_response(self.core_name(), &body)
    }

    /// Whether partial updates are safe on this core.
    ///
    /// True iff the core has an update log. The first call probes
    /// `config`; the answer is memoized for the lifetime of this
    /// connection. A probe failure counts as "no update log" and is
    /// memoized as well.
    pub async fn should_use_atomic_update(&self) -> bool {
        if let Some(enabled) = self.update_log.get() {
            return enabled;
        }

        let enabled = match self.probe_update_log().await {
            Ok(enabled) => {
                info!(
                    "UpdateLog status for {} is: {}",
                    self.core_url,
                    if enabled { "enabled" } else { "disabled" }
                );
                enabled
            }
            Err(e) => {
                warn!(
                    "{}. Assuming the update log is disabled.",
                    SolrError::ConfigProbe(e.to_string())
                );
                false
            }
        };

        self.update_log.store(enabled);
        enabled
    }

    async fn probe_update_log(&self) -> Result<bool> {
        let body = self.get_json("config", &[]).await?;
        Ok(update_log_enabled(&body))
    }

    /// Look up one document by its unique key
    pub async fn get_document_by_id(
        &self,
        unique_key_field: &str,
        doc_id: &str,
    ) -> Result<Option<Document>> {
        let params = vec![
            ("q".to_string(), id_query(unique_key_field, doc_id)),
            ("rows".to_string(), "1".to_string()),
        ];

        let response = self
            .select_params(&params)
            .await
            .inspect_err(|e| error!("Error fetching document with id {}: {}", doc_id, e))?;

        Ok(response.response.docs.into_iter().next())
    }

    /// Run a field substring search
    pub async fn search_documents(&self, request: &SearchRequest) -> Result<SearchResults> {
        let query = request.to_query()?;
        info!(
            "Running search: '{}' (rows={}, start={})",
            query, request.rows, request.start
        );

        let response = self.select(request).await.inspect_err(|e| {
            error!(
                "Error searching for '{}' in field '{:?}': {}",
                request.query, request.field, e
            )
        })?;

        Ok(SearchResults {
            docs: response.response.docs,
            num_found: response.response.num_found,
            start: request.start,
            rows: request.rows,
            query,
            highlighting: response.highlighting,
        })
    }

    /// Replace a whole document
    pub async fn update_document(&self, doc: Document) -> Result<()> {
        self.add_documents(&[doc.into()], true)
            .await
            .inspect_err(|e| error!("Error updating document: {}", e))?;
        info!("Document updated successfully");
        Ok(())
    }

    /// Post documents to the update handler
    pub async fn add_documents(&self, docs: &[Value], commit: bool) -> Result<()> {
        let url = format!("{}/update", self.core_url);
        debug!("Posting {} document(s) to {}", docs.len(), url);

        let response = self
            .http
            .post(&url)
            .query(&[("commit", commit.to_string()), ("wt", "json".to_string())])
            .json(docs)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    async fn select(&self, request: &SearchRequest) -> Result<SelectResponse> {
        let params = request.to_params()?;
        self.select_params(&params).await
    }

    async fn select_params(&self, params: &[(String, String)]) -> Result<SelectResponse> {
        let body = self.get_json("select", params).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn get_json(&self, handler: &str, params: &[(String, String)]) -> Result<Value> {
        let url = format!("{}/{}", self.core_url, handler);
        debug!("GET {} {:?}", url, params);

        let response = self
            .http
            .get(&url)
            .query(&[("wt", "json")])
            .query(params)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json::<Value>().await?)
    }
}

/// Turn non-2xx answers into [`SolrError::Server`], using Solr's
/// `error.msg` when the body carries one.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| {
            body.pointer("/error/msg")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if text.is_empty() {
                status.to_string()
            } else {
                text
            }
        });

    Err(SolrError::Server {
        status: status.as_u16(),
        message,
    })
}
