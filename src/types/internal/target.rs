/// Path segment used by batch-delete endpoints in place of a document id
pub const BATCH_DELETE_SEGMENT: &str = "batch-delete";

/// The collection and (optionally) the document a mutating request addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub collection: String,
    pub id: Option<String>,
}

impl Target {
    /// The id to snapshot, excluding the batch-delete literal
    pub fn snapshot_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| *id != BATCH_DELETE_SEGMENT)
    }
}
