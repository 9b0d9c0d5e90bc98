use poem_openapi::Object;
use serde::Serialize;
use serde_json::Value;

/// Response model for health check endpoint
#[derive(Object, Debug)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,

    /// Package name of the running service
    pub service: String,

    /// Package version of the running service
    pub version: String,

    /// Timestamp of the health check (ISO 8601 format)
    pub timestamp: String,
}

/// Uniform response envelope shared by every admin endpoint
#[derive(Object, Serialize, Debug, Clone, PartialEq)]
pub struct ApiEnvelope {
    /// HTTP status code of the response
    pub status: u16,

    /// 0 on success, the HTTP status code on error
    pub code: u16,

    /// Human-readable message
    pub msg: String,

    /// Payload, null on error
    pub data: Option<Value>,
}

impl ApiEnvelope {
    pub fn success(data: Value) -> Self {
        Self {
            status: 200,
            code: 0,
            msg: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(status: u16, msg: impl Into<String>) -> Self {
        Self {
            status,
            code: status,
            msg: msg.into(),
            data: None,
        }
    }
}
