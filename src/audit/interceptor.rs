use std::sync::Arc;
use std::time::Instant;

use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};
use serde_json::Value;

use crate::api::helpers::{extract_ip_address, query_params};
use crate::audit::redact::{redact_params, serialize_snapshot};
use crate::audit::{AuditEmitter, AuditEntryBuilder, snapshot, target_resolver};
use crate::stores::DocumentStore;
use crate::types::internal::audit::AuditMethod;
use crate::types::internal::context::Identity;

/// Middleware that records every mutating request in the audit log
///
/// Requests without a verified [`Identity`] in their extensions are not recorded,
/// so this must be wrapped by the auth middleware.
pub struct AuditInterceptor {
    documents: Arc<DocumentStore>,
    emitter: AuditEmitter,
}

impl AuditInterceptor {
    pub fn new(documents: Arc<DocumentStore>, emitter: AuditEmitter) -> Self {
        Self { documents, emitter }
    }
}

impl<E: Endpoint> Middleware<E> for AuditInterceptor {
    type Output = AuditInterceptorEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        AuditInterceptorEndpoint {
            inner: ep,
            documents: self.documents.clone(),
            emitter: self.emitter.clone(),
        }
    }
}

pub struct AuditInterceptorEndpoint<E> {
    inner: E,
    documents: Arc<DocumentStore>,
    emitter: AuditEmitter,
}

impl<E: Endpoint> Endpoint for AuditInterceptorEndpoint<E> {
    type Output = Response;

    async fn call(&self, mut req: Request) -> Result<Self::Output> {
        let method = AuditMethod::from_request_method(req.method().as_str());
        let identity = req.extensions().get::<Identity>().cloned();

        let (Some(method), Some(identity)) = (method, identity) else {
            return self.inner.call(req).await.map(IntoResponse::into_response);
        };

        let started = Instant::now();
        let uri = req.original_uri().clone();
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());
        let target = target_resolver::resolve(method.as_str(), uri.path());

        let body = req.take_body().into_bytes().await?;
        req.set_body(body.clone());
        let query = query_params(&req);
        let params = redact_params(&query, parse_request_body(&body));

        let ip = extract_ip_address(&req).unwrap_or_else(|| "unknown".to_string());
        let user_agent = req.header("User-Agent").map(str::to_string);

        let snapshot = snapshot::capture(&self.documents, method, target.as_ref())
            .await
            .and_then(|doc| serialize_snapshot(&doc));

        let mut resp = match self.inner.call(req).await {
            Ok(resp) => resp.into_response(),
            Err(err) => err.into_response(),
        };

        let mut builder = AuditEntryBuilder::new(method)
            .with_identity(&identity)
            .path(path)
            .params(params)
            .snapshot(snapshot)
            .target(target.as_ref());

        if method == AuditMethod::Post && target.as_ref().is_some_and(|t| t.id.is_none()) {
            let body = resp.take_body().into_bytes().await.unwrap_or_else(|e| {
                tracing::warn!("Failed to buffer response body for audit: {}", e);
                Default::default()
            });
            if let Some(id) = created_document_id(&body) {
                builder = builder.document_id(id);
            }
            resp.set_body(body);
        }

        let entry = builder
            .status(resp.status().as_u16())
            .duration_ms(i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX))
            .ip(ip)
            .user_agent(user_agent)
            .build();
        self.emitter.emit(entry);

        Ok(resp)
    }
}

fn parse_request_body(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }

    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(body).into_owned())),
    }
}

/// Read the id of a created document from a response body
///
/// Looks at `data._id`, `data.id`, then the top-level `_id` and `id`.
fn created_document_id(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let data = value.get("data");

    [
        data.and_then(|d| d.get("_id")),
        data.and_then(|d| d.get("id")),
        value.get("_id"),
        value.get("id"),
    ]
    .into_iter()
    .flatten()
    .find_map(|candidate| match candidate {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
