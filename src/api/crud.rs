// CRUD operations shared by the core and system collection APIs

use std::collections::HashMap;

use poem_openapi::payload::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::helpers::page_param;
use crate::errors::{ApiError, InternalError};
use crate::stores::DocumentStore;
use crate::types::ApiResult;
use crate::types::dto::common::ApiEnvelope;
use crate::types::dto::core::BatchDeleteRequest;
use crate::types::internal::document::Fields;

const DEFAULT_PAGE_SIZE: u64 = 10;

fn success<T: Serialize>(data: &T) -> ApiResult {
    let value = serde_json::to_value(data).map_err(|e| InternalError::parse("response", e.to_string()))?;
    Ok(Json(ApiEnvelope::success(value)))
}

fn object_body(body: Value) -> Result<Fields, ApiError> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}

pub async fn list(documents: &DocumentStore, collection: &str, query: HashMap<String, String>) -> ApiResult {
    let page_num = page_param(&query, "pageNum", 1)?;
    let page_size = page_param(&query, "pageSize", DEFAULT_PAGE_SIZE)?;

    let page = documents
        .for_collection(collection)
        .list(&query, page_num, page_size)
        .await?;

    success(&page)
}

pub async fn get(documents: &DocumentStore, collection: &str, id: &str) -> ApiResult {
    match documents.for_collection(collection).get_by_id(id).await? {
        Some(doc) => success(&doc),
        None => Err(ApiError::not_found("Document not found")),
    }
}

pub async fn create(documents: &DocumentStore, collection: &str, body: Value) -> ApiResult {
    let doc = documents
        .for_collection(collection)
        .create(object_body(body)?)
        .await?;

    success(&doc)
}

pub async fn update(documents: &DocumentStore, collection: &str, id: &str, body: Value) -> ApiResult {
    match documents
        .for_collection(collection)
        .update(id, object_body(body)?)
        .await?
    {
        Some(doc) => success(&doc),
        None => Err(ApiError::not_found("Document not found")),
    }
}

pub async fn delete(documents: &DocumentStore, collection: &str, id: &str) -> ApiResult {
    let outcome = documents.for_collection(collection).delete(id).await?;

    success(&outcome)
}

pub async fn batch_delete(documents: &DocumentStore, collection: &str, body: BatchDeleteRequest) -> ApiResult {
    if body.ids.is_empty() {
        return Err(ApiError::bad_request("ids must be a non-empty array"));
    }

    let outcome = documents.for_collection(collection).batch_delete(&body.ids).await?;

    success(&outcome)
}
