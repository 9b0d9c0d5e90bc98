// Audit subsystem - capture, record and revert mutating requests
pub mod audit_builder;
pub mod emitter;
pub mod interceptor;
pub mod redact;
pub mod rollback;
pub mod snapshot;
pub mod target_resolver;

pub use audit_builder::AuditEntryBuilder;
pub use emitter::AuditEmitter;
pub use interceptor::AuditInterceptor;
pub use rollback::{RollbackEngine, RollbackOutcome};
pub use target_resolver::resolve;
