use migration::{AuditMigrator, DocumentMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::config::BootstrapSettings;
use crate::errors::InternalError;

/// Connections to the document database and the audit database
///
/// The audit log lives in its own database so document traffic and audit
/// writes never contend for the same SQLite file lock.
pub struct DatabaseConnections {
    pub documents: DatabaseConnection,
    pub audit: DatabaseConnection,
}

impl DatabaseConnections {
    /// Connect both databases
    ///
    /// Does NOT run migrations - call [`DatabaseConnections::migrate`] separately.
    pub async fn init(bootstrap_settings: &BootstrapSettings) -> Result<Self, InternalError> {
        let documents = connect(bootstrap_settings.database_url(), "connect_database").await?;
        let audit = connect(bootstrap_settings.audit_database_url(), "connect_audit_database").await?;

        Ok(Self { documents, audit })
    }

    pub async fn migrate(&self) -> Result<(), InternalError> {
        migrate_documents_database(&self.documents).await?;
        migrate_audit_database(&self.audit).await?;

        Ok(())
    }
}

async fn connect(url: &str, operation: &str) -> Result<DatabaseConnection, InternalError> {
    let db = Database::connect(url)
        .await
        .map_err(|e| InternalError::database(operation, e))?;

    tracing::debug!("Connected to database: {}", url);

    Ok(db)
}

/// Run migrations on the document database
///
/// # Returns
/// * `Ok(())` - Migrations completed successfully
/// * `Err(InternalError)` - Migration failed
pub async fn migrate_documents_database(db: &DatabaseConnection) -> Result<(), InternalError> {
    DocumentMigrator::up(db, None)
        .await
        .map_err(|e| InternalError::database("run_migrations", e))?;

    tracing::debug!("Document database migrations completed");

    Ok(())
}

/// Run migrations on the audit database
pub async fn migrate_audit_database(audit_db: &DatabaseConnection) -> Result<(), InternalError> {
    AuditMigrator::up(audit_db, None)
        .await
        .map_err(|e| InternalError::database("run_audit_migrations", e))?;

    tracing::debug!("Audit database migrations completed");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_init_and_migrate_in_memory() {
        let env = MockEnvironment::empty().with_vars(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("AUDIT_DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "test-secret-key-minimum-32-characters-long"),
            ("PASSWORD_PEPPER", "pepper"),
        ]);
        let settings = BootstrapSettings::from_env_provider(Arc::new(env)).unwrap();

        let connections = DatabaseConnections::init(&settings).await.unwrap();

        connections.migrate().await.unwrap();
        // Migrations are idempotent
        connections.migrate().await.unwrap();
    }
}
