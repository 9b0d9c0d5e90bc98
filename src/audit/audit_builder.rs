use crate::types::internal::audit::{AuditMethod, NewAuditLogEntry};
use crate::types::internal::context::Identity;
use crate::types::internal::target::Target;

/// Builder for audit log entries
///
/// Provides a fluent API so the interceptor and the rollback engine fill in the
/// same entry shape.
///
/// # Example
/// ```
/// use corelog_backend::audit::AuditEntryBuilder;
/// use corelog_backend::types::internal::audit::AuditMethod;
/// use corelog_backend::types::internal::context::Identity;
///
/// let entry = AuditEntryBuilder::new(AuditMethod::Delete)
///     .with_identity(&Identity::new("u-1", "alice"))
///     .path("/api/admin/core/products/0190")
///     .status(200)
///     .build();
/// assert_eq!(entry.username, "alice");
/// ```
pub struct AuditEntryBuilder {
    entry: NewAuditLogEntry,
}

impl AuditEntryBuilder {
    /// Create a new builder for the given method
    pub fn new(method: AuditMethod) -> Self {
        Self {
            entry: NewAuditLogEntry {
                user_id: String::new(),
                username: String::new(),
                method,
                path: String::new(),
                params: None,
                snapshot: None,
                collection_name: String::new(),
                document_id: String::new(),
                status: 200,
                duration_ms: 0,
                ip: "unknown".to_string(),
                user_agent: None,
            },
        }
    }

    /// Populate the actor fields from a verified identity
    pub fn with_identity(mut self, identity: &Identity) -> Self {
        self.entry.user_id = identity.user_id.clone();
        self.entry.username = identity.username.clone();
        self
    }

    pub fn actor(mut self, user_id: impl Into<String>, username: impl Into<String>) -> Self {
        self.entry.user_id = user_id.into();
        self.entry.username = username.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.entry.path = path.into();
        self
    }

    pub fn params(mut self, params: Option<String>) -> Self {
        self.entry.params = params;
        self
    }

    pub fn snapshot(mut self, snapshot: Option<String>) -> Self {
        self.entry.snapshot = snapshot;
        self
    }

    /// Record the resolved target; an unresolved request leaves both fields empty
    pub fn target(mut self, target: Option<&Target>) -> Self {
        if let Some(target) = target {
            self.entry.collection_name = target.collection.clone();
            self.entry.document_id = target.id.clone().unwrap_or_default();
        }
        self
    }

    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.entry.collection_name = collection.into();
        self
    }

    /// Set the document id when one was learned after resolution (created documents)
    pub fn document_id(mut self, document_id: impl Into<String>) -> Self {
        self.entry.document_id = document_id.into();
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.entry.status = status;
        self
    }

    pub fn duration_ms(mut self, duration_ms: i64) -> Self {
        self.entry.duration_ms = duration_ms;
        self
    }

    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.entry.ip = ip.into();
        self
    }

    pub fn user_agent(mut self, user_agent: Option<String>) -> Self {
        self.entry.user_agent = user_agent;
        self
    }

    pub fn build(self) -> NewAuditLogEntry {
        self.entry
    }
}
