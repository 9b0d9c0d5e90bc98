pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_documents;
mod m20250301_000002_create_audit_logs;

pub struct DocumentMigrator;

#[async_trait::async_trait]
impl MigratorTrait for DocumentMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000001_create_documents::Migration)]
    }
}

pub struct AuditMigrator;

#[async_trait::async_trait]
impl MigratorTrait for AuditMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000002_create_audit_logs::Migration)]
    }
}
