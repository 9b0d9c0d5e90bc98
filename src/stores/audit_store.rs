use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde_json::Value;

use crate::errors::InternalError;
use crate::errors::internal::AuditError;
use crate::stores::page_offset;
use crate::types::db::audit_log::{self, Entity as AuditLog};
use crate::types::internal::audit::{AuditLogEntry, AuditLogPage, AuditMethod, AuditQuery, NewAuditLogEntry};

/// Params key of a ROLLBACK entry naming the entry it reverted
pub const ORIGINAL_LOG_ID_KEY: &str = "originalLogId";

/// Repository for audit log storage operations
///
/// Entries are append-only apart from the rolled-back flag.
pub struct AuditStore {
    db: DatabaseConnection,
}

impl AuditStore {
    /// Create a new AuditStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append an entry and return its id
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the database insert fails
    pub async fn append(&self, entry: NewAuditLogEntry) -> Result<i64, InternalError> {
        let model = audit_log::ActiveModel {
            id: sea_orm::ActiveValue::NotSet, // Let auto-increment handle this
            user_id: Set(entry.user_id),
            username: Set(entry.username),
            method: Set(entry.method.as_str().to_string()),
            path: Set(entry.path),
            params: Set(entry.params),
            snapshot: Set(entry.snapshot),
            collection_name: Set(entry.collection_name),
            document_id: Set(entry.document_id),
            status: Set(i32::from(entry.status)),
            duration: Set(entry.duration_ms),
            ip: Set(entry.ip),
            user_agent: Set(entry.user_agent),
            is_rolled_back: Set(false),
            created_at: Set(Utc::now()),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("append_audit_log", e))?;

        Ok(inserted.id)
    }

    pub async fn get(&self, id: i64) -> Result<Option<AuditLogEntry>, InternalError> {
        let model = AuditLog::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("get_audit_log", e))?;

        Ok(model.map(AuditLogEntry::from))
    }

    /// Query entries, newest first
    ///
    /// Username is a case-insensitive substring match, method an exact match and
    /// the date range is inclusive on both ends.
    pub async fn query(&self, query: &AuditQuery) -> Result<AuditLogPage, InternalError> {
        let page = query.page.max(1);
        let page_size = query.page_size.max(1);
        let offset = page_offset(page, page_size).ok_or_else(|| {
            AuditError::InvalidQuery(format!("page {} of size {} is out of range", page, page_size))
        })?;

        let mut select = AuditLog::find();

        if let Some(username) = query.username.as_deref().filter(|u| !u.is_empty()) {
            select = select.filter(Expr::cust_with_values(
                "instr(LOWER(username), LOWER(?)) > 0",
                [username.to_string()],
            ));
        }
        if let Some(method) = query.method.as_deref().filter(|m| !m.is_empty()) {
            select = select.filter(audit_log::Column::Method.eq(method.to_ascii_uppercase()));
        }
        if let Some(start) = query.start_date {
            select = select.filter(audit_log::Column::CreatedAt.gte(start));
        }
        if let Some(end) = query.end_date {
            select = select.filter(audit_log::Column::CreatedAt.lte(end));
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("count_audit_logs", e))?;

        let list = select
            .order_by_desc(audit_log::Column::CreatedAt)
            .order_by_desc(audit_log::Column::Id)
            .offset(offset)
            .limit(page_size)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("query_audit_logs", e))?
            .into_iter()
            .map(AuditLogEntry::from)
            .collect();

        Ok(AuditLogPage {
            list,
            total,
            page,
            page_size,
        })
    }

    /// Flag an entry as rolled back
    ///
    /// # Returns
    /// * `Ok(true)` - The flag was flipped by this call
    /// * `Ok(false)` - No such entry, or it was already flagged
    pub async fn mark_rolled_back(&self, id: i64) -> Result<bool, InternalError> {
        let result = AuditLog::update_many()
            .col_expr(audit_log::Column::IsRolledBack, Expr::value(true))
            .filter(audit_log::Column::Id.eq(id))
            .filter(audit_log::Column::IsRolledBack.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("mark_audit_log_rolled_back", e))?;

        Ok(result.rows_affected > 0)
    }

    /// Repair pass: flag every entry that a ROLLBACK entry names as its original
    ///
    /// Entries whose params cannot be parsed are skipped with a warning.
    ///
    /// # Returns
    /// The number of ROLLBACK entries that were reconciled
    pub async fn sync_rollback_status(&self) -> Result<u64, InternalError> {
        let rollbacks = AuditLog::find()
            .filter(audit_log::Column::Method.eq(AuditMethod::Rollback.as_str()))
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("find_rollback_logs", e))?;

        let mut count = 0;
        for log in rollbacks {
            let Some(params) = log.params.as_deref() else {
                continue;
            };

            match original_log_id(params) {
                Some(original_id) => {
                    self.mark_rolled_back(original_id).await?;
                    count += 1;
                }
                None => {
                    tracing::warn!("Failed to parse params for rollback log {}", log.id);
                }
            }
        }

        tracing::info!("Synced rollback status for {} logs", count);
        Ok(count)
    }
}

/// Extract `originalLogId` from serialized ROLLBACK params
fn original_log_id(params: &str) -> Option<i64> {
    let value: Value = serde_json::from_str(params).ok()?;
    match value.get(ORIGINAL_LOG_ID_KEY)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{sample_entry, setup_test_stores};
    use crate::types::internal::audit::{DateBound, parse_date_bound};
    use chrono::Duration;

    #[tokio::test]
    async fn test_append_and_get() {
        let (_db, _audit_db, _documents, audit_store) = setup_test_stores().await;

        let id = audit_store.append(sample_entry("alice", AuditMethod::Post)).await.unwrap();
        let entry = audit_store.get(id).await.unwrap().unwrap();

        assert_eq!(entry.id, id);
        assert_eq!(entry.username, "alice");
        assert_eq!(entry.method, "POST");
        assert!(!entry.is_rolled_back);
        assert!(audit_store.get(id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_newest_first_with_pagination() {
        let (_db, _audit_db, _documents, audit_store) = setup_test_stores().await;
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(audit_store.append(sample_entry("alice", AuditMethod::Put)).await.unwrap());
        }

        let page = audit_store
            .query(&AuditQuery {
                page: 1,
                page_size: 2,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.list.len(), 2);
        assert_eq!(page.list[0].id, ids[2]);
        assert_eq!(page.list[1].id, ids[1]);
    }

    #[tokio::test]
    async fn test_query_rejects_unaddressable_page() {
        let (_db, _audit_db, _documents, audit_store) = setup_test_stores().await;

        let result = audit_store
            .query(&AuditQuery {
                page: u64::MAX,
                page_size: 2,
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(InternalError::Audit(AuditError::InvalidQuery(_)))));
    }

    #[tokio::test]
    async fn test_query_filters_username_and_method() {
        let (_db, _audit_db, _documents, audit_store) = setup_test_stores().await;
        audit_store.append(sample_entry("Alice", AuditMethod::Post)).await.unwrap();
        audit_store.append(sample_entry("alice2", AuditMethod::Delete)).await.unwrap();
        audit_store.append(sample_entry("bob", AuditMethod::Post)).await.unwrap();

        let by_name = audit_store
            .query(&AuditQuery {
                username: Some("ALI".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let by_both = audit_store
            .query(&AuditQuery {
                username: Some("ali".to_string()),
                method: Some("POST".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(by_name.total, 2);
        assert_eq!(by_both.total, 1);
        assert_eq!(by_both.list[0].username, "Alice");
    }

    #[tokio::test]
    async fn test_query_date_range_is_inclusive() {
        let (_db, _audit_db, _documents, audit_store) = setup_test_stores().await;
        audit_store.append(sample_entry("alice", AuditMethod::Post)).await.unwrap();
        let today = Utc::now().format("%Y-%m-%d").to_string();

        let today_only = audit_store
            .query(&AuditQuery {
                start_date: Some(parse_date_bound(&today, DateBound::Start).unwrap()),
                end_date: Some(parse_date_bound(&today, DateBound::End).unwrap()),
                ..Default::default()
            })
            .await
            .unwrap();
        let future = audit_store
            .query(&AuditQuery {
                start_date: Some(Utc::now() + Duration::days(1)),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(today_only.total, 1);
        assert_eq!(future.total, 0);
    }

    #[tokio::test]
    async fn test_mark_rolled_back_flips_once() {
        let (_db, _audit_db, _documents, audit_store) = setup_test_stores().await;
        let id = audit_store.append(sample_entry("alice", AuditMethod::Put)).await.unwrap();

        assert!(audit_store.mark_rolled_back(id).await.unwrap());
        assert!(!audit_store.mark_rolled_back(id).await.unwrap());
        assert!(audit_store.get(id).await.unwrap().unwrap().is_rolled_back);
    }

    #[tokio::test]
    async fn test_sync_rollback_status_repairs_flags() {
        let (_db, _audit_db, _documents, audit_store) = setup_test_stores().await;
        let original = audit_store.append(sample_entry("alice", AuditMethod::Put)).await.unwrap();

        let mut rollback = sample_entry("alice", AuditMethod::Rollback);
        rollback.params = Some(format!("{{\"originalLogId\":{}}}", original));
        audit_store.append(rollback).await.unwrap();

        let mut broken = sample_entry("alice", AuditMethod::Rollback);
        broken.params = Some("{\"originalLogId\":".to_string());
        audit_store.append(broken).await.unwrap();

        let count = audit_store.sync_rollback_status().await.unwrap();

        assert_eq!(count, 1);
        assert!(audit_store.get(original).await.unwrap().unwrap().is_rolled_back);
    }

    #[test]
    fn test_original_log_id_accepts_number_or_string() {
        assert_eq!(original_log_id("{\"originalLogId\":7}"), Some(7));
        assert_eq!(original_log_id("{\"originalLogId\":\"8\"}"), Some(8));
        assert_eq!(original_log_id("{}"), None);
        assert_eq!(original_log_id("garbage"), None);
    }
}
