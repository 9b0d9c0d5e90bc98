use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, Tags, param::Path, payload::Json};
use serde_json::Value;

use crate::api::{crud, helpers};
use crate::stores::DocumentStore;
use crate::types::ApiResult;
use crate::types::dto::core::BatchDeleteRequest;

/// Generic CRUD over any collection named in the route
pub struct CoreApi {
    documents: Arc<DocumentStore>,
}

impl CoreApi {
    pub fn new(documents: Arc<DocumentStore>) -> Self {
        Self { documents }
    }
}

/// API tags for generic collection endpoints
#[derive(Tags)]
enum CoreTags {
    /// Generic collection CRUD
    Core,
}

#[OpenApi]
impl CoreApi {
    /// List documents
    ///
    /// Accepts `pageNum` (default 1), `pageSize` (default 10) and any other query
    /// parameter as a case-insensitive substring filter on the field of that name.
    #[oai(path = "/core/:collection", method = "get", tag = "CoreTags::Core")]
    async fn list(&self, req: &Request, collection: Path<String>) -> ApiResult {
        crud::list(&self.documents, &collection.0, helpers::query_params(req)).await
    }

    /// Create a document
    #[oai(path = "/core/:collection", method = "post", tag = "CoreTags::Core")]
    async fn create(&self, collection: Path<String>, body: Json<Value>) -> ApiResult {
        crud::create(&self.documents, &collection.0, body.0).await
    }

    /// Delete several documents
    #[oai(path = "/core/:collection/batch-delete", method = "post", tag = "CoreTags::Core")]
    async fn batch_delete(&self, collection: Path<String>, body: Json<BatchDeleteRequest>) -> ApiResult {
        crud::batch_delete(&self.documents, &collection.0, body.0).await
    }

    /// Fetch one document
    #[oai(path = "/core/:collection/:id", method = "get", tag = "CoreTags::Core")]
    async fn get(&self, collection: Path<String>, id: Path<String>) -> ApiResult {
        crud::get(&self.documents, &collection.0, &id.0).await
    }

    /// Update a document
    ///
    /// Shallow-merges the body into the stored document.
    #[oai(path = "/core/:collection/:id", method = "put", tag = "CoreTags::Core")]
    async fn update(&self, collection: Path<String>, id: Path<String>, body: Json<Value>) -> ApiResult {
        crud::update(&self.documents, &collection.0, &id.0, body.0).await
    }

    /// Partially update a document
    #[oai(path = "/core/:collection/:id", method = "patch", tag = "CoreTags::Core")]
    async fn patch(&self, collection: Path<String>, id: Path<String>, body: Json<Value>) -> ApiResult {
        crud::update(&self.documents, &collection.0, &id.0, body.0).await
    }

    /// Delete a document
    #[oai(path = "/core/:collection/:id", method = "delete", tag = "CoreTags::Core")]
    async fn delete(&self, collection: Path<String>, id: Path<String>) -> ApiResult {
        crud::delete(&self.documents, &collection.0, &id.0).await
    }
}
