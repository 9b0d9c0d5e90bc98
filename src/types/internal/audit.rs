use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::errors::internal::AuditError;
use crate::types::db::audit_log;

/// Method recorded on an audit log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditMethod {
    Post,
    Put,
    Patch,
    Delete,
    /// Synthetic method of the compensating entry written by a rollback
    Rollback,
}

impl AuditMethod {
    /// Convert AuditMethod to string representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Rollback => "ROLLBACK",
        }
    }

    /// Map an inbound HTTP method to the audited method, if it mutates state
    pub fn from_request_method(method: &str) -> Option<Self> {
        match Self::parse(method)? {
            Self::Rollback => None,
            audited => Some(audited),
        }
    }

    /// Parse a stored method value
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            "ROLLBACK" => Some(Self::Rollback),
            _ => None,
        }
    }

    /// Whether the prior state of the target is captured before the handler runs
    pub fn captures_snapshot(&self) -> bool {
        matches!(self, Self::Put | Self::Patch | Self::Delete)
    }
}

impl fmt::Display for AuditMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit log entry ready to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditLogEntry {
    pub user_id: String,
    pub username: String,
    pub method: AuditMethod,
    pub path: String,
    pub params: Option<String>,
    pub snapshot: Option<String>,
    pub collection_name: String,
    pub document_id: String,
    pub status: u16,
    pub duration_ms: i64,
    pub ip: String,
    pub user_agent: Option<String>,
}

/// Stored audit log entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: i64,
    pub user_id: String,
    pub username: String,
    pub method: String,
    pub path: String,
    pub params: Option<String>,
    pub snapshot: Option<String>,
    pub collection_name: String,
    pub document_id: String,
    pub status: i32,
    pub duration: i64,
    pub ip: String,
    pub user_agent: Option<String>,
    pub is_rolled_back: bool,
    pub created_at: DateTime<Utc>,
}

impl From<audit_log::Model> for AuditLogEntry {
    fn from(model: audit_log::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            username: model.username,
            method: model.method,
            path: model.path,
            params: model.params,
            snapshot: model.snapshot,
            collection_name: model.collection_name,
            document_id: model.document_id,
            status: model.status,
            duration: model.duration,
            ip: model.ip,
            user_agent: model.user_agent,
            is_rolled_back: model.is_rolled_back,
            created_at: model.created_at,
        }
    }
}

/// Filters and pagination for audit log queries
#[derive(Debug, Clone, PartialEq)]
pub struct AuditQuery {
    pub page: u64,
    pub page_size: u64,
    pub username: Option<String>,
    pub method: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            username: None,
            method: None,
            start_date: None,
            end_date: None,
        }
    }
}

/// Which end of an inclusive date range a value bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Start,
    End,
}

/// Parse a date range bound
///
/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates. A plain date used as
/// the end bound covers the whole day.
pub fn parse_date_bound(value: &str, bound: DateBound) -> Result<DateTime<Utc>, AuditError> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AuditError::InvalidQuery(format!("invalid date: {}", value)))?;
    let time = match bound {
        DateBound::Start => NaiveTime::MIN,
        DateBound::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap_or(NaiveTime::MIN),
    };

    Ok(date.and_time(time).and_utc())
}

/// One page of audit log entries, newest first
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogPage {
    pub list: Vec<AuditLogEntry>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}
