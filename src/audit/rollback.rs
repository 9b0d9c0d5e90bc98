use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};

use crate::audit::AuditEntryBuilder;
use crate::audit::redact::TRUNCATION_MARKER;
use crate::errors::InternalError;
use crate::errors::internal::RollbackError;
use crate::stores::audit_store::ORIGINAL_LOG_ID_KEY;
use crate::stores::{AuditStore, DocumentStore};
use crate::types::internal::audit::{AuditLogEntry, AuditMethod};
use crate::types::internal::document::{Document, Fields, ID_FIELD};
use crate::types::internal::target::BATCH_DELETE_SEGMENT;

/// Actor id recorded on compensating ROLLBACK entries
pub const SYSTEM_ACTOR: &str = "system";

/// IP recorded on compensating ROLLBACK entries
pub const INTERNAL_IP: &str = "internal";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackOutcome {
    pub success: bool,
    pub message: String,
}

/// The mutation that undoes a recorded operation
#[derive(Debug, Clone, PartialEq)]
pub enum InverseAction {
    /// Re-insert the deleted document
    Restore(Document),
    /// Merge the prior field values back into the updated document
    Revert(Fields),
    /// Delete the created document
    Remove,
}

impl InverseAction {
    fn message(&self) -> &'static str {
        match self {
            InverseAction::Restore(_) => "Restored deleted document",
            InverseAction::Revert(_) => "Reverted updates",
            InverseAction::Remove => "Deleted created document",
        }
    }
}

/// Decide how to undo an audit log entry
///
/// Runs every precondition before anything is mutated, in this order:
/// already rolled back, unsupported method, missing target, missing snapshot,
/// unusable snapshot.
pub fn plan(entry: &AuditLogEntry) -> Result<InverseAction, RollbackError> {
    if entry.is_rolled_back {
        return Err(RollbackError::AlreadyRolledBack(entry.id));
    }

    let method = match AuditMethod::parse(&entry.method) {
        Some(AuditMethod::Rollback) | None => {
            return Err(RollbackError::UnsupportedOperation(entry.method.clone()));
        }
        Some(method) => method,
    };

    // Batch deletes record no per-document snapshot
    if entry.document_id == BATCH_DELETE_SEGMENT {
        return Err(RollbackError::UnsupportedOperation(format!(
            "{} {}",
            entry.method, BATCH_DELETE_SEGMENT
        )));
    }

    if entry.collection_name.is_empty() || entry.document_id.is_empty() {
        return Err(RollbackError::MissingTarget(entry.id));
    }

    if method == AuditMethod::Post {
        return Ok(InverseAction::Remove);
    }

    let snapshot = entry
        .snapshot
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(RollbackError::NoSnapshotAvailable(entry.id))?;
    let mut fields = parse_snapshot(entry.id, snapshot)?;

    match method {
        AuditMethod::Delete => {
            if !fields.contains_key(ID_FIELD) {
                fields.insert(ID_FIELD.to_string(), Value::String(entry.document_id.clone()));
            }
            Ok(InverseAction::Restore(Document::from_fields(fields)))
        }
        _ => {
            fields.remove(ID_FIELD);
            Ok(InverseAction::Revert(fields))
        }
    }
}

fn parse_snapshot(log_id: i64, snapshot: &str) -> Result<Fields, RollbackError> {
    let corrupt = |reason: String| RollbackError::CorruptSnapshot { log_id, reason };

    if snapshot.ends_with(TRUNCATION_MARKER) {
        return Err(corrupt("snapshot was truncated".to_string()));
    }

    match serde_json::from_str::<Value>(snapshot) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(corrupt("snapshot is not a JSON object".to_string())),
        Err(e) => Err(corrupt(e.to_string())),
    }
}

/// Applies the inverse of recorded mutations
pub struct RollbackEngine {
    documents: Arc<DocumentStore>,
    audit_store: Arc<AuditStore>,
}

impl RollbackEngine {
    pub fn new(documents: Arc<DocumentStore>, audit_store: Arc<AuditStore>) -> Self {
        Self {
            documents,
            audit_store,
        }
    }

    /// Revert the operation recorded by an audit log entry
    ///
    /// On success the inverse mutation is applied, the original entry is flagged
    /// and a ROLLBACK entry is appended. The flag is only set after the inverse
    /// mutation succeeded. Failing to append the ROLLBACK entry is logged only.
    ///
    /// # Arguments
    /// * `log_id` - Id of the entry to revert
    /// * `operator` - Username of the caller requesting the rollback
    pub async fn rollback(&self, log_id: i64, operator: &str) -> Result<RollbackOutcome, InternalError> {
        let entry = self
            .audit_store
            .get(log_id)
            .await?
            .ok_or(RollbackError::NotFound(log_id))?;

        let action = plan(&entry)?;

        self.apply_inverse(&entry, action, operator).await
    }

    /// Apply a planned inverse, then claim the entry
    ///
    /// A caller that loses the flag to a concurrent rollback of the same entry
    /// gets `AlreadyRolledBack` and records no ROLLBACK entry.
    async fn apply_inverse(
        &self,
        entry: &AuditLogEntry,
        action: InverseAction,
        operator: &str,
    ) -> Result<RollbackOutcome, InternalError> {
        let log_id = entry.id;
        let message = action.message();
        let collection = self.documents.for_collection(&entry.collection_name);

        match action {
            InverseAction::Restore(doc) => {
                collection.restore(doc).await?;
            }
            InverseAction::Revert(fields) => {
                collection
                    .apply_snapshot(&entry.document_id, fields)
                    .await?
                    .ok_or_else(|| RollbackError::TargetDocumentMissing {
                        collection: entry.collection_name.clone(),
                        document_id: entry.document_id.clone(),
                    })?;
            }
            InverseAction::Remove => {
                let outcome = collection.delete(&entry.document_id).await?;
                if outcome.deleted_count == 0 {
                    tracing::info!(
                        "Created document {}/{} was already gone",
                        entry.collection_name,
                        entry.document_id
                    );
                }
            }
        }

        if !self.audit_store.mark_rolled_back(log_id).await? {
            tracing::warn!("Audit log {} was rolled back concurrently", log_id);
            return Err(RollbackError::AlreadyRolledBack(log_id).into());
        }

        let record = AuditEntryBuilder::new(AuditMethod::Rollback)
            .actor(SYSTEM_ACTOR, operator)
            .path(format!("/rollback/{}", log_id))
            .params(Some(json!({ ORIGINAL_LOG_ID_KEY: log_id }).to_string()))
            .collection(entry.collection_name.clone())
            .document_id(entry.document_id.clone())
            .status(200)
            .duration_ms(0)
            .ip(INTERNAL_IP)
            .build();

        if let Err(e) = self.audit_store.append(record).await {
            tracing::error!("Failed to record rollback of audit log {}: {}", log_id, e);
        }

        tracing::info!("Audit log {} rolled back by {}: {}", log_id, operator, message);

        Ok(RollbackOutcome {
            success: true,
            message: message.to_string(),
        })
    }
}
