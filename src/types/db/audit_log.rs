use sea_orm::entity::prelude::*;

/// SeaORM entity for audit_logs table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub username: String,
    pub method: String,
    pub path: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub params: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub snapshot: Option<String>,
    pub collection_name: String,
    pub document_id: String,
    pub status: i32,
    pub duration: i64,
    pub ip: String,
    pub user_agent: Option<String>,
    pub is_rolled_back: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
