use std::borrow::Cow;

use crate::stores::collection::system_collection;
use crate::types::internal::audit::AuditMethod;
use crate::types::internal::target::Target;

const CORE_SEGMENT: &str = "core";
const SYS_SEGMENT: &str = "sys";

/// Infer the collection and document a mutating request addresses from its route
///
/// `/…/core/{collection}[/{id}]` names the collection directly; `/…/sys/{alias}[/{id}]`
/// goes through the system alias table. Non-mutating methods and any other path
/// are unresolved.
pub fn resolve(method: &str, path: &str) -> Option<Target> {
    AuditMethod::from_request_method(method)?;

    let path = path.split('?').next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    // A core marker without a collection stays unresolved
    if let Some(pos) = segments.iter().position(|s| *s == CORE_SEGMENT) {
        let collection = segments.get(pos + 1)?;
        return Some(Target {
            collection: decode(collection).into_owned(),
            id: segments.get(pos + 2).map(|id| decode(id).into_owned()),
        });
    }

    let pos = segments.iter().position(|s| *s == SYS_SEGMENT)?;
    let collection = system_collection(segments.get(pos + 1)?)?;

    Some(Target {
        collection: collection.to_string(),
        id: segments.get(pos + 2).map(|id| decode(id).into_owned()),
    })
}

fn decode(segment: &str) -> Cow<'_, str> {
    urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(collection: &str, id: Option<&str>) -> Option<Target> {
        Some(Target {
            collection: collection.to_string(),
            id: id.map(str::to_string),
        })
    }

    #[test]
    fn test_core_collection_and_id() {
        assert_eq!(
            resolve("PUT", "/api/admin/core/products/0190a"),
            target("products", Some("0190a"))
        );
        assert_eq!(resolve("POST", "/api/admin/core/products"), target("products", None));
    }

    #[test]
    fn test_query_string_is_ignored() {
        assert_eq!(
            resolve("DELETE", "/api/admin/core/products/abc?force=true"),
            target("products", Some("abc"))
        );
    }

    #[test]
    fn test_segments_are_percent_decoded() {
        assert_eq!(
            resolve("PATCH", "/api/admin/core/my%20items/a%2Fb"),
            target("my items", Some("a/b"))
        );
    }

    #[test]
    fn test_sys_aliases() {
        assert_eq!(resolve("PUT", "/api/admin/sys/user/42"), target("sys_user", Some("42")));
        assert_eq!(resolve("POST", "/api/admin/sys/menu"), target("sys_menu", None));
        assert_eq!(resolve("DELETE", "/api/admin/sys/schema/7"), target("sys_schema", Some("7")));
        assert_eq!(resolve("POST", "/api/admin/sys/unknown/1"), None);
    }

    #[test]
    fn test_core_takes_precedence_over_sys() {
        assert_eq!(resolve("PUT", "/sys/core/things/1"), target("things", Some("1")));
    }

    #[test]
    fn test_trailing_core_marker_does_not_fall_back_to_sys() {
        assert_eq!(resolve("PUT", "/api/admin/sys/user/core"), None);
        assert_eq!(resolve("DELETE", "/api/admin/core"), None);
    }

    #[test]
    fn test_unresolved_paths() {
        assert_eq!(resolve("POST", "/api/admin/core"), None);
        assert_eq!(resolve("POST", "/api/admin/audit/3/rollback"), None);
        assert_eq!(resolve("POST", "/"), None);
    }

    #[test]
    fn test_non_mutating_methods_are_unresolved() {
        assert_eq!(resolve("GET", "/api/admin/core/products/abc"), None);
        assert_eq!(resolve("OPTIONS", "/api/admin/core/products"), None);
    }

    #[test]
    fn test_batch_delete_is_not_a_snapshot_id() {
        let resolved = resolve("POST", "/api/admin/core/products/batch-delete").unwrap();

        assert_eq!(resolved.id.as_deref(), Some("batch-delete"));
        assert_eq!(resolved.snapshot_id(), None);
    }
}
