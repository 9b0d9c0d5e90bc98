use thiserror::Error;

/// Reasons a rollback request is refused or cannot complete
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RollbackError {
    #[error("Audit log not found: {0}")]
    NotFound(i64),

    #[error("Audit log {0} has already been rolled back")]
    AlreadyRolledBack(i64),

    #[error("Target collection or document ID missing in audit log {0}")]
    MissingTarget(i64),

    #[error("No snapshot available for rollback of audit log {0}")]
    NoSnapshotAvailable(i64),

    #[error("Snapshot of audit log {log_id} cannot be restored: {reason}")]
    CorruptSnapshot { log_id: i64, reason: String },

    #[error("Unsupported rollback method: {0}")]
    UnsupportedOperation(String),

    #[error("Document {document_id} no longer exists in collection {collection}")]
    TargetDocumentMissing {
        collection: String,
        document_id: String,
    },
}
