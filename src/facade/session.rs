use crate::connection::SolrConnection;
use crate::connection::config::ConnectionConfig;
use crate::core::{Document, Result, SolrError, parse_field_input};
use crate::schema::{DisplayField, FieldDef, FieldSummary, SchemaModel, display_fields};
use crate::search::{SearchRequest, SearchResults};
use crate::update::{UpdateIntent, UpdateStrategy};
use serde_json::Value;
use std::fmt;
use tracing::{error, info};

/// A connection together with the schema loaded for it.
///
/// This is what a presentation layer keeps per selected core: the schema is
/// fetched once in [`Session::open`] and reused for every request.
pub struct Session {
    connection: SolrConnection,
    schema: SchemaModel,
    indexed_fields: Vec<FieldSummary>,
}

/// Document page data: the document and one row per known field
#[derive(Debug, Clone)]
pub struct RecordView {
    pub document: Document,
    pub fields: Vec<DisplayField>,
}

/// Data for editing one field
#[derive(Debug, Clone)]
pub struct FieldEditView {
    pub document: Option<Document>,
    pub definition: FieldDef,
    pub current_value: Option<Value>,
    pub strategy: UpdateStrategy,
    pub warning: Option<&'static str>,
}

/// Successful edit, with the document as re-read after the commit
#[derive(Debug, Clone)]
pub struct FieldEditOutcome {
    pub strategy: UpdateStrategy,
    pub definition: FieldDef,
    pub document: Option<Document>,
}

/// Failed edit. Carries the document as it was before the attempt so the
/// caller can show the unchanged state next to the error.
#[derive(Debug)]
pub struct FieldEditFailure {
    pub original: Option<Document>,
    pub definition: FieldDef,
    pub error: SolrError,
}

impl fmt::Display for FieldEditFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for FieldEditFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl Session {
    /// Connect, verify the core answers, and load its schema
    pub async fn open(config: ConnectionConfig) -> Result<Self> {
        let connection = SolrConnection::new(config)?;
        Self::with_connection(connection).await
    }

    pub async fn with_connection(connection: SolrConnection) -> Result<Self> {
        if !connection.check_connection().await {
            return Err(SolrError::Connectivity(format!(
                "core at {} is not reachable",
                connection.core_url()
            )));
        }

        let schema = connection.get_schema().await?;
        let indexed_fields = schema.indexed_fields();
        info!(
            "Session opened for core '{}' ({} indexed fields)",
            schema.core(),
            indexed_fields.len()
        );

        Ok(Self {
            connection,
            schema,
            indexed_fields,
        })
    }

    pub fn connection(&self) -> &SolrConnection {
        &self.connection
    }

    pub fn schema(&self) -> &SchemaModel {
        &self.schema
    }

    pub fn indexed_fields(&self) -> &[FieldSummary] {
        &self.indexed_fields
    }

    pub fn unique_key_field(&self) -> &str {
        self.schema.unique_key_field()
    }

    pub async fn find_document(&self, doc_id: &str) -> Result<Option<Document>> {
        self.connection
            .get_document_by_id(self.unique_key_field(), doc_id)
            .await
    }

    /// Document plus display rows, or `None` when no such document exists
    pub async fn record(&self, doc_id: &str) -> Result<Option<RecordView>> {
        let Some(document) = self.find_document(doc_id).await? else {
            return Ok(None);
        };
        let fields = display_fields(&document, &self.schema);
        Ok(Some(RecordView { document, fields }))
    }

    pub async fn edit_view(&self, doc_id: &str, field_name: &str) -> Result<FieldEditView> {
        let document = self.find_document(doc_id).await?;
        let definition = self.schema.resolve(field_name, document.as_ref());
        let current_value = document.as_ref().and_then(|d| d.get(field_name).cloned());
        let strategy = self.strategy().await;

        Ok(FieldEditView {
            document,
            definition,
            current_value,
            strategy,
            warning: strategy.data_loss_warning(),
        })
    }

    /// Edit one field from raw form input and re-read the document.
    ///
    /// `multi_valued` input is split into one value per line.
    pub async fn edit_field(
        &self,
        doc_id: &str,
        field_name: &str,
        raw_value: &str,
        multi_valued: bool,
    ) -> std::result::Result<FieldEditOutcome, FieldEditFailure> {
        let original = self.find_document(doc_id).await.ok().flatten();
        let definition = self.schema.resolve(field_name, original.as_ref());
        let value = parse_field_input(raw_value, multi_valued);

        match self.write_field(doc_id, field_name, value).await {
            Ok(strategy) => {
                let document = self.find_document(doc_id).await.ok().flatten();
                Ok(FieldEditOutcome {
                    strategy,
                    definition,
                    document,
                })
            }
            Err(error) => {
                error!("Error updating field: {}", error);
                Err(FieldEditFailure {
                    original,
                    definition,
                    error,
                })
            }
        }
    }

    /// Add a field that the document does not carry yet
    pub async fn add_field(&self, doc_id: &str, field_name: &str, raw_value: &str) -> Result<()> {
        let field_name = field_name.trim();
        if field_name.is_empty() {
            return Err(SolrError::InvalidQuery("field name is required".to_string()));
        }

        if self.find_document(doc_id).await?.is_none() {
            return Err(SolrError::NotFound {
                key_field: self.unique_key_field().to_string(),
                doc_id: doc_id.to_string(),
            });
        }

        self.write_field(doc_id, field_name, Value::String(raw_value.to_string()))
            .await?;
        info!("Field '{}' added to document {}", field_name, doc_id);
        Ok(())
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        self.connection.search_documents(request).await
    }

    async fn strategy(&self) -> UpdateStrategy {
        UpdateStrategy::from_update_log(self.connection.should_use_atomic_update().await)
    }

    async fn write_field(
        &self,
        doc_id: &str,
        field_name: &str,
        value: Value,
    ) -> Result<UpdateStrategy> {
        let strategy = self.strategy().await;
        let intent = UpdateIntent::new(self.unique_key_field(), doc_id, field_name, value)
            .copy_fields(self.schema.copy_fields());
        self.connection.update_field(strategy, &intent).await?;
        Ok(strategy)
    }
}
