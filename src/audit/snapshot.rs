use crate::stores::DocumentStore;
use crate::types::internal::audit::AuditMethod;
use crate::types::internal::document::Document;
use crate::types::internal::target::Target;

/// Fetch the current state of the document a request is about to mutate
///
/// Only PUT, PATCH and DELETE with a resolved document id are captured. Any
/// failure is logged and yields `None`; capture never fails the request.
pub async fn capture(documents: &DocumentStore, method: AuditMethod, target: Option<&Target>) -> Option<Document> {
    if !method.captures_snapshot() {
        return None;
    }

    let target = target?;
    let id = target.snapshot_id()?;

    match documents.for_collection(&target.collection).get_by_id(id).await {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(
                "Snapshot capture failed for {}/{}: {}",
                target.collection,
                id,
                e
            );
            None
        }
    }
}
