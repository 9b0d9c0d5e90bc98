// Test utilities shared across unit and integration tests
// Only compiled when running tests

use std::sync::Arc;

use migration::{AuditMigrator, DocumentMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::providers::{CryptoProvider, TokenProvider};
use crate::stores::{AuditStore, CollectionRegistry, DocumentStore};
use crate::types::internal::audit::{AuditMethod, NewAuditLogEntry};

pub const TEST_JWT_SECRET: &str = "test-secret-key-minimum-32-characters-long";
pub const TEST_PASSWORD_PEPPER: &str = "test-pepper-for-unit-tests";

/// Creates test databases and stores with standard configuration
///
/// Returns (documents_db, audit_db, document_store, audit_store)
///
/// Callers can discard what they don't need:
/// ```ignore
/// let (_db, _audit_db, documents, _audit_store) = setup_test_stores().await;
/// ```
pub async fn setup_test_stores() -> (
    DatabaseConnection,
    DatabaseConnection,
    Arc<DocumentStore>,
    Arc<AuditStore>,
) {
    let documents_db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    DocumentMigrator::up(&documents_db, None)
        .await
        .expect("Failed to run document migrations");

    let audit_db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit database");

    AuditMigrator::up(&audit_db, None)
        .await
        .expect("Failed to run audit migrations");

    let crypto = Arc::new(CryptoProvider::new(TEST_PASSWORD_PEPPER));
    let document_store = Arc::new(DocumentStore::new(
        documents_db.clone(),
        CollectionRegistry::default(),
        crypto,
    ));
    let audit_store = Arc::new(AuditStore::new(audit_db.clone()));

    (documents_db, audit_db, document_store, audit_store)
}

pub fn test_token_provider() -> TokenProvider {
    TokenProvider::new(TEST_JWT_SECRET)
}

/// An audit entry with placeholder request metadata
pub fn sample_entry(username: &str, method: AuditMethod) -> NewAuditLogEntry {
    NewAuditLogEntry {
        user_id: format!("{}-id", username),
        username: username.to_string(),
        method,
        path: "/api/admin/core/products".to_string(),
        params: None,
        snapshot: None,
        collection_name: "products".to_string(),
        document_id: String::new(),
        status: 200,
        duration_ms: 5,
        ip: "127.0.0.1".to_string(),
        user_agent: None,
    }
}
