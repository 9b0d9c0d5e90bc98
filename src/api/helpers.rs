use std::collections::HashMap;

use poem::{IntoResponse, Request, Response};
use poem_openapi::payload::Json;

use crate::errors::ApiError;
use crate::types::dto::common::ApiEnvelope;

/// Extract the client IP address from a request
///
/// Prefers the first `X-Forwarded-For` entry, then `X-Real-IP`, then the peer address.
pub fn extract_ip_address(req: &Request) -> Option<String> {
    // Check X-Forwarded-For header (proxy/load balancer)
    if let Some(forwarded) = req.header("X-Forwarded-For") {
        if let Some(ip) = forwarded.split(',').next().map(str::trim).filter(|ip| !ip.is_empty()) {
            return Some(ip.to_string());
        }
    }

    // Check X-Real-IP header (nginx)
    if let Some(real_ip) = req.header("X-Real-IP") {
        return Some(real_ip.trim().to_string());
    }

    // Fall back to remote address
    req.remote_addr()
        .as_socket_addr()
        .map(|addr| addr.ip().to_string())
}

/// All query string parameters of a request
pub fn query_params(req: &Request) -> HashMap<String, String> {
    req.params::<HashMap<String, String>>().unwrap_or_default()
}

/// Read a paging parameter, falling back to `default` when absent
///
/// Values below 1 are passed through as 1; non-numeric values are rejected.
pub fn page_param(query: &HashMap<String, String>, key: &str, default: u64) -> Result<u64, ApiError> {
    match query.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .parse::<i64>()
            .map(|n| n.max(1) as u64)
            .map_err(|_| ApiError::bad_request(format!("{} must be an integer", key))),
    }
}

/// Render a framework-level error in the response envelope
///
/// Covers what poem and poem-openapi reject before a handler runs, such as
/// malformed JSON, a wrong content type or unparsable parameters. Responses
/// that are already JSON pass through unchanged.
pub async fn envelope_error(err: poem::Error) -> Response {
    let status = err.status();
    let resp = err.into_response();
    if resp.content_type().is_some_and(|ct| ct.starts_with("application/json")) {
        return resp;
    }

    let msg = match resp.into_body().into_string().await {
        Ok(text) if !text.trim().is_empty() => text,
        _ => status.canonical_reason().unwrap_or("Request failed").to_string(),
    };

    let mut resp = Json(ApiEnvelope::error(status.as_u16(), msg)).into_response();
    resp.set_status(status);
    resp
}
