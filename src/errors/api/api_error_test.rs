use super::ApiError;
use crate::errors::internal::{
    AuditError, CredentialError, DocumentError, InternalError, RollbackError,
};
use sea_orm::DbErr;

#[test]
fn test_invalid_argument_maps_to_bad_request() {
    let err = ApiError::from_internal_error(DocumentError::invalid_id("xyz").into());

    assert_eq!(err.status_code(), 400);
    assert!(err.message().contains("xyz"));
}

#[test]
fn test_rollback_errors_map_to_distinct_statuses() {
    let not_found = ApiError::from_internal_error(RollbackError::NotFound(7).into());
    let already = ApiError::from_internal_error(RollbackError::AlreadyRolledBack(7).into());
    let missing = ApiError::from_internal_error(RollbackError::MissingTarget(7).into());
    let no_snapshot = ApiError::from_internal_error(RollbackError::NoSnapshotAvailable(7).into());
    let unsupported = ApiError::from_internal_error(
        RollbackError::UnsupportedOperation("ROLLBACK".to_string()).into(),
    );

    assert_eq!(not_found.status_code(), 404);
    assert_eq!(already.status_code(), 409);
    assert_eq!(missing.status_code(), 422);
    assert_eq!(no_snapshot.status_code(), 422);
    assert_eq!(unsupported.status_code(), 422);
    assert!(already.message().contains("already been rolled back"));
}

#[test]
fn test_database_error_is_not_exposed() {
    let err = InternalError::database(
        "list_documents",
        DbErr::Custom("disk I/O error at /var/lib/db".to_string()),
    );

    let api_err = ApiError::from_internal_error(err);

    assert_eq!(api_err.status_code(), 500);
    assert_eq!(api_err.message(), "An internal error occurred");
}

#[test]
fn test_credential_errors_map_to_unauthorized() {
    let err = ApiError::from_internal_error(CredentialError::ExpiredToken.into());

    assert_eq!(err.status_code(), 401);
}

#[test]
fn test_invalid_audit_query_maps_to_bad_request() {
    let err = ApiError::from_internal_error(AuditError::InvalidQuery("bad date".to_string()).into());

    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_error_envelope_has_null_data() {
    let err = ApiError::conflict("already exists");

    match err {
        ApiError::Conflict(json) => {
            assert_eq!(json.0.status, 409);
            assert_eq!(json.0.code, 409);
            assert!(json.0.data.is_none());
        }
        other => panic!("unexpected variant: {:?}", other),
    }
}
