use crate::errors::internal::{
    AuditError, CredentialError, DocumentError, InternalError, RollbackError,
};
use crate::types::dto::common::ApiEnvelope;
use poem_openapi::{ApiResponse, payload::Json};
use std::fmt;

/// Error responses of the admin API
///
/// Every variant carries the uniform envelope with `data` set to null.
#[derive(ApiResponse, Debug)]
pub enum ApiError {
    /// Malformed identifier, payload or query
    #[oai(status = 400)]
    BadRequest(Json<ApiEnvelope>),

    /// Missing or invalid bearer token
    #[oai(status = 401)]
    Unauthorized(Json<ApiEnvelope>),

    /// Requested resource does not exist
    #[oai(status = 404)]
    NotFound(Json<ApiEnvelope>),

    /// Request conflicts with current state
    #[oai(status = 409)]
    Conflict(Json<ApiEnvelope>),

    /// Request is well-formed but cannot be carried out
    #[oai(status = 422)]
    Unprocessable(Json<ApiEnvelope>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ApiEnvelope>),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(Json(ApiEnvelope::error(400, msg)))
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(Json(ApiEnvelope::error(401, msg)))
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(Json(ApiEnvelope::error(404, msg)))
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(Json(ApiEnvelope::error(409, msg)))
    }

    pub fn unprocessable(msg: impl Into<String>) -> Self {
        ApiError::Unprocessable(Json(ApiEnvelope::error(422, msg)))
    }

    /// Create a generic internal server error
    ///
    /// Always returns a generic message without exposing internal details.
    pub fn internal_server_error() -> Self {
        ApiError::InternalError(Json(ApiEnvelope::error(500, "An internal error occurred")))
    }

    /// Convert InternalError to ApiError
    ///
    /// This is the explicit conversion point from internal errors to API errors.
    /// Infrastructure error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Database(_) => {
                tracing::error!("Storage error: {}", err);
                Self::internal_server_error()
            }
            InternalError::Parse { value_type, .. } => {
                tracing::error!("Parse error for {}: {}", value_type, err);
                Self::internal_server_error()
            }
            InternalError::Crypto { operation, .. } => {
                tracing::error!("Crypto error in {}: {}", operation, err);
                Self::internal_server_error()
            }

            InternalError::Document(DocumentError::InvalidArgument(_)) => {
                Self::bad_request(err.to_string())
            }
            InternalError::Document(DocumentError::Conflict { .. }) => {
                Self::conflict(err.to_string())
            }

            InternalError::Rollback(RollbackError::NotFound(_)) => Self::not_found(err.to_string()),
            InternalError::Rollback(RollbackError::AlreadyRolledBack(_))
            | InternalError::Rollback(RollbackError::TargetDocumentMissing { .. }) => {
                Self::conflict(err.to_string())
            }
            InternalError::Rollback(_) => Self::unprocessable(err.to_string()),

            InternalError::Audit(AuditError::InvalidQuery(_)) => Self::bad_request(err.to_string()),
            InternalError::Audit(AuditError::LogWriteFailed(_)) => {
                tracing::error!("Audit store error: {}", err);
                Self::internal_server_error()
            }

            InternalError::Credential(CredentialError::PasswordHashingFailed(_)) => {
                tracing::error!("Credential error: {}", err);
                Self::internal_server_error()
            }
            InternalError::Credential(_) => Self::unauthorized(err.to_string()),
        }
    }

    fn envelope(&self) -> &ApiEnvelope {
        match self {
            ApiError::BadRequest(json)
            | ApiError::Unauthorized(json)
            | ApiError::NotFound(json)
            | ApiError::Conflict(json)
            | ApiError::Unprocessable(json)
            | ApiError::InternalError(json) => &json.0,
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        self.envelope().msg.clone()
    }

    /// Get the HTTP status code from the error variant
    pub fn status_code(&self) -> u16 {
        self.envelope().status
    }
}

impl From<InternalError> for ApiError {
    fn from(err: InternalError) -> Self {
        Self::from_internal_error(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
