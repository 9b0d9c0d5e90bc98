use std::sync::Arc;

use crate::audit::RollbackEngine;
use crate::config::{BootstrapSettings, DatabaseConnections};
use crate::providers::{CryptoProvider, TokenProvider};
use crate::stores::{AuditStore, CollectionRegistry, DocumentStore};

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once in main.rs and shared with the API layer.
///
/// ```text
/// main.rs
///   ↓
/// AppData::init()
///   ↓ creates once
///   ├─ document_store (Arc<DocumentStore>)    documents database
///   ├─ audit_store (Arc<AuditStore>)          audit database
///   ├─ rollback_engine (Arc<RollbackEngine>)  both stores
///   └─ token_provider (Arc<TokenProvider>)
///   ↓ passed to api::routes()
/// ```
pub struct AppData {
    pub connections: DatabaseConnections,
    pub document_store: Arc<DocumentStore>,
    pub audit_store: Arc<AuditStore>,
    pub rollback_engine: Arc<RollbackEngine>,
    pub token_provider: Arc<TokenProvider>,
}

impl AppData {
    /// Initialize all application data
    ///
    /// Database connections should be initialized and migrated before calling this.
    pub fn init(connections: DatabaseConnections, settings: &BootstrapSettings) -> Self {
        tracing::info!("Initializing AppData...");

        let crypto = Arc::new(CryptoProvider::new(settings.password_pepper()));
        let document_store = Arc::new(DocumentStore::new(
            connections.documents.clone(),
            CollectionRegistry::default(),
            crypto,
        ));
        let audit_store = Arc::new(AuditStore::new(connections.audit.clone()));
        let rollback_engine = Arc::new(RollbackEngine::new(document_store.clone(), audit_store.clone()));
        let token_provider = Arc::new(TokenProvider::new(settings.jwt_secret()));

        tracing::info!("AppData initialization complete");

        Self {
            connections,
            document_store,
            audit_store,
            rollback_engine,
            token_provider,
        }
    }
}
