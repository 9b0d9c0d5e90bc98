use crate::config::{DatabaseConnections, migrate_audit_database, migrate_documents_database};
use crate::errors::InternalError;

/// Run database migrations for the document and audit databases
///
/// Does not initialize the full AppData structure.
pub async fn run_migrations(connections: &DatabaseConnections) -> Result<(), InternalError> {
    tracing::info!("Running database migrations...");

    tracing::info!("Migrating document database...");
    migrate_documents_database(&connections.documents).await?;

    tracing::info!("Migrating audit database...");
    migrate_audit_database(&connections.audit).await?;

    tracing::info!("All migrations completed successfully");

    Ok(())
}
