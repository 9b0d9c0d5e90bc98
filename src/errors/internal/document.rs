use thiserror::Error;

/// Document store specific errors
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Malformed identifier or payload
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A document with the same identifier already exists in the collection
    #[error("Document {id} already exists in collection {collection}")]
    Conflict { collection: String, id: String },
}

impl DocumentError {
    pub fn invalid_id(id: &str) -> Self {
        Self::InvalidArgument(format!("invalid document id: {}", id))
    }
}
