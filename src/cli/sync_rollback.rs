use crate::errors::InternalError;
use crate::stores::AuditStore;

/// Reconcile `isRolledBack` flags with the ROLLBACK entries in the audit log
///
/// # Returns
/// The number of ROLLBACK entries that were reconciled
pub async fn sync_rollback_status(audit_store: &AuditStore) -> Result<u64, InternalError> {
    let count = audit_store.sync_rollback_status().await?;
    println!("Synced rollback status for {} audit log entries", count);
    Ok(count)
}
