use super::strategy::UpdateStrategy;
use crate::connection::SolrConnection;
use crate::core::{Document, Result, SolrError, VERSION_FIELD};
use crate::schema::CopyField;
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use tracing::{debug, error, info};

/// Request to change one field of one document
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateIntent {
    pub unique_key_field: String,
    pub doc_id: String,
    pub field_name: String,
    pub field_value: Value,
    pub copy_fields: Vec<CopyField>,
}

impl UpdateIntent {
    pub fn new(
        unique_key_field: impl Into<String>,
        doc_id: impl Into<String>,
        field_name: impl Into<String>,
        field_value: Value,
    ) -> Self {
        Self {
            unique_key_field: unique_key_field.into(),
            doc_id: doc_id.into(),
            field_name: field_name.into(),
            field_value,
            copy_fields: Vec::new(),
        }
    }

    pub fn copy_fields(mut self, copy_fields: &[CopyField]) -> Self {
        self.copy_fields = copy_fields.to_vec();
        self
    }
}

/// Progress of a single field edit, traced at debug level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    Idle,
    FetchingOriginal,
    Mutating,
    Submitting,
    Committed,
    Failed,
}

/// Partial-update document: exactly the unique key and the field wrapped
/// in a `set` operation.
pub fn atomic_payload(intent: &UpdateIntent) -> Value {
    let mut doc = Map::new();
    doc.insert(
        intent.unique_key_field.clone(),
        Value::String(intent.doc_id.clone()),
    );
    doc.insert(
        intent.field_name.clone(),
        json!({ "set": intent.field_value }),
    );
    Value::Object(doc)
}

/// Full document to resubmit in place of `original`.
///
/// Sets the field, then drops the `_version_` token and every copy-field
/// destination. Solr fills the destinations again from their sources.
pub fn rewrite_payload(mut original: Document, intent: &UpdateIntent) -> Document {
    original.insert(intent.field_name.clone(), intent.field_value.clone());
    original.remove(VERSION_FIELD);

    let destinations: HashSet<&str> = intent
        .copy_fields
        .iter()
        .map(|cf| cf.dest.as_str())
        .collect();
    for dest in destinations {
        original.remove(dest);
    }

    original
}

impl SolrConnection {
    /// Write one field using the given strategy.
    ///
    /// The strategy is trusted as-is; callers pick it with
    /// [`SolrConnection::should_use_atomic_update`]. Failures come back as
    /// [`SolrError::Update`] with the cause attached, except a missing
    /// document on the full-rewrite path which is [`SolrError::NotFound`].
    pub async fn update_field(
        &self,
        strategy: UpdateStrategy,
        intent: &UpdateIntent,
    ) -> Result<()> {
        debug!(phase = ?UpdatePhase::Idle, %strategy, "Starting field update");

        let result = match strategy {
            UpdateStrategy::Atomic => self.update_atomic(intent).await,
            UpdateStrategy::FullRewrite => self.update_full_document(intent).await,
        };

        match result {
            Ok(()) => {
                debug!(phase = ?UpdatePhase::Committed);
                info!(
                    "Field '{}' of document '{}' updated successfully",
                    intent.field_name, intent.doc_id
                );
                Ok(())
            }
            Err(err) => {
                debug!(phase = ?UpdatePhase::Failed);
                error!(
                    "Error updating field '{}' of document '{}': {}",
                    intent.field_name, intent.doc_id, err
                );
                Err(match err {
                    SolrError::NotFound { .. } => err,
                    other => SolrError::Update {
                        field: intent.field_name.clone(),
                        doc_id: intent.doc_id.clone(),
                        source: Box::new(other),
                    },
                })
            }
        }
    }

    async fn update_atomic(&self, intent: &UpdateIntent) -> Result<()> {
        debug!(phase = ?UpdatePhase::Mutating);
        let payload = atomic_payload(intent);

        debug!(phase = ?UpdatePhase::Submitting);
        self.add_documents(&[payload], true).await?;
        info!("Atomic update applied");
        Ok(())
    }

    async fn update_full_document(&self, intent: &UpdateIntent) -> Result<()> {
        debug!(phase = ?UpdatePhase::FetchingOriginal);
        let original = self
            .get_document_by_id(&intent.unique_key_field, &intent.doc_id)
            .await?
            .ok_or_else(|| SolrError::NotFound {
                key_field: intent.unique_key_field.clone(),
                doc_id: intent.doc_id.clone(),
            })?;

        debug!(phase = ?UpdatePhase::Mutating);
        let payload = rewrite_payload(original, intent);

        debug!(phase = ?UpdatePhase::Submitting);
        self.add_documents(&[payload.into()], true).await?;
        info!("Full-document update applied");
        Ok(())
    }
}
