// Database entities - SeaORM models
pub mod audit_log;
pub mod document;
