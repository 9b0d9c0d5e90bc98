use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuditLogs::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(AuditLogs::UserId).string().not_null())
                    .col(ColumnDef::new(AuditLogs::Username).string().not_null())
                    .col(ColumnDef::new(AuditLogs::Method).string().not_null())
                    .col(ColumnDef::new(AuditLogs::Path).string().not_null())
                    .col(ColumnDef::new(AuditLogs::Params).text())
                    .col(ColumnDef::new(AuditLogs::Snapshot).text())
                    .col(ColumnDef::new(AuditLogs::CollectionName).string().not_null().default(""))
                    .col(ColumnDef::new(AuditLogs::DocumentId).string().not_null().default(""))
                    .col(ColumnDef::new(AuditLogs::Status).integer().not_null())
                    .col(ColumnDef::new(AuditLogs::Duration).big_integer().not_null())
                    .col(ColumnDef::new(AuditLogs::Ip).string().not_null())
                    .col(ColumnDef::new(AuditLogs::UserAgent).string())
                    .col(ColumnDef::new(AuditLogs::IsRolledBack).boolean().not_null().default(false))
                    .col(ColumnDef::new(AuditLogs::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_logs_created_at")
                    .table(AuditLogs::Table)
                    .col(AuditLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_logs_method")
                    .table(AuditLogs::Table)
                    .col(AuditLogs::Method)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum AuditLogs {
    Table,
    Id,
    UserId,
    Username,
    Method,
    Path,
    Params,
    Snapshot,
    CollectionName,
    DocumentId,
    Status,
    Duration,
    Ip,
    UserAgent,
    IsRolledBack,
    CreatedAt,
}
