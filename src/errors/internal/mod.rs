use thiserror::Error;

pub mod audit;
pub mod credential;
pub mod database;
pub mod document;
pub mod rollback;

pub use audit::AuditError;
pub use credential::CredentialError;
pub use database::DatabaseError;
pub use document::DocumentError;
pub use rollback::RollbackError;

/// Internal error type for store, provider and engine operations
///
/// Hybrid design separates infrastructure errors (shared) from domain errors (store-specific).
/// Not exposed via API - endpoints must convert to ApiError.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse {
        value_type: String,
        message: String,
    },

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto {
        operation: String,
        message: String,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Rollback(#[from] RollbackError),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl InternalError {
    /// Create a database error with the name of the failed operation
    pub fn database(operation: &str, source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn parse(value_type: impl Into<String>, message: impl Into<String>) -> InternalError {
        InternalError::Parse {
            value_type: value_type.into(),
            message: message.into(),
        }
    }

    pub fn crypto(operation: impl Into<String>, message: impl Into<String>) -> InternalError {
        InternalError::Crypto {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
