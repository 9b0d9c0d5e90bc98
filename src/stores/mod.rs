// Stores layer - Data access and repository pattern
pub mod audit_store;
pub mod collection;
pub mod document_store;

pub use audit_store::AuditStore;
pub use collection::{CollectionDescriptor, CollectionRegistry};
pub use document_store::{CollectionHandle, DocumentStore};

/// Row offset of a 1-based page
///
/// `None` when the offset or the page size does not fit SQLite's signed 64-bit
/// OFFSET/LIMIT.
pub(crate) fn page_offset(page: u64, page_size: u64) -> Option<u64> {
    let offset = page.max(1).checked_sub(1)?.checked_mul(page_size)?;
    (i64::try_from(offset).is_ok() && i64::try_from(page_size).is_ok()).then_some(offset)
}
