use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, Tags, param::{Path, Query}, payload::Json};

use crate::audit::RollbackEngine;
use crate::errors::{ApiError, InternalError};
use crate::stores::AuditStore;
use crate::types::ApiResult;
use crate::types::dto::common::ApiEnvelope;
use crate::types::internal::audit::{AuditQuery, DateBound, parse_date_bound};
use crate::types::internal::context::Identity;

/// Audit log browsing and rollback endpoints
pub struct AuditApi {
    audit_store: Arc<AuditStore>,
    rollback_engine: Arc<RollbackEngine>,
}

impl AuditApi {
    pub fn new(audit_store: Arc<AuditStore>, rollback_engine: Arc<RollbackEngine>) -> Self {
        Self {
            audit_store,
            rollback_engine,
        }
    }
}

/// API tags for audit endpoints
#[derive(Tags)]
enum AuditTags {
    /// Audit log and rollback
    Audit,
}

fn date_bound(value: Option<String>, bound: DateBound) -> Result<Option<chrono::DateTime<chrono::Utc>>, InternalError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_date_bound(&v, bound))
        .transpose()
        .map_err(InternalError::from)
}

#[OpenApi]
impl AuditApi {
    /// Query audit log entries, newest first
    #[oai(path = "/", method = "get", tag = "AuditTags::Audit")]
    async fn list(
        &self,
        page: Query<Option<u64>>,
        #[oai(name = "pageSize")] page_size: Query<Option<u64>>,
        username: Query<Option<String>>,
        method: Query<Option<String>>,
        #[oai(name = "startDate")] start_date: Query<Option<String>>,
        #[oai(name = "endDate")] end_date: Query<Option<String>>,
    ) -> ApiResult {
        let defaults = AuditQuery::default();
        let query = AuditQuery {
            page: page.0.unwrap_or(defaults.page),
            page_size: page_size.0.unwrap_or(defaults.page_size),
            username: username.0,
            method: method.0,
            start_date: date_bound(start_date.0, DateBound::Start)?,
            end_date: date_bound(end_date.0, DateBound::End)?,
        };

        let page = self.audit_store.query(&query).await?;
        let data = serde_json::to_value(&page).map_err(|e| InternalError::parse("audit_page", e.to_string()))?;

        Ok(Json(ApiEnvelope::success(data)))
    }

    /// Roll back the operation recorded by an audit log entry
    ///
    /// The caller's username is recorded as the operator.
    #[oai(path = "/:id/rollback", method = "post", tag = "AuditTags::Audit")]
    async fn rollback(&self, req: &Request, id: Path<String>) -> ApiResult {
        let log_id: i64 = id
            .0
            .parse()
            .map_err(|_| ApiError::bad_request(format!("Invalid audit log id: {}", id.0)))?;
        let operator = req
            .extensions()
            .get::<Identity>()
            .map(|identity| identity.username.clone())
            .ok_or_else(|| ApiError::unauthorized("No token provided"))?;

        let outcome = self.rollback_engine.rollback(log_id, &operator).await?;
        let data = serde_json::to_value(&outcome).map_err(|e| InternalError::parse("rollback_outcome", e.to_string()))?;

        Ok(Json(ApiEnvelope::success(data)))
    }
}
