use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, Tags, param::Path, payload::Json};
use serde_json::Value;

use crate::api::{crud, helpers};
use crate::errors::ApiError;
use crate::stores::DocumentStore;
use crate::stores::collection::system_collection;
use crate::types::ApiResult;
use crate::types::dto::core::BatchDeleteRequest;

/// CRUD over the built-in system collections, addressed by alias
pub struct SysApi {
    documents: Arc<DocumentStore>,
}

impl SysApi {
    pub fn new(documents: Arc<DocumentStore>) -> Self {
        Self { documents }
    }
}

/// API tags for system collection endpoints
#[derive(Tags)]
enum SysTags {
    /// Menus, roles, users, entities, views and schemas
    System,
}

fn collection_for(alias: &str) -> Result<&'static str, ApiError> {
    system_collection(alias).ok_or_else(|| ApiError::not_found(format!("Unknown system collection: {}", alias)))
}

#[OpenApi]
impl SysApi {
    /// List documents of a system collection
    #[oai(path = "/sys/:alias", method = "get", tag = "SysTags::System")]
    async fn list(&self, req: &Request, alias: Path<String>) -> ApiResult {
        crud::list(&self.documents, collection_for(&alias.0)?, helpers::query_params(req)).await
    }

    /// Create a document in a system collection
    #[oai(path = "/sys/:alias", method = "post", tag = "SysTags::System")]
    async fn create(&self, alias: Path<String>, body: Json<Value>) -> ApiResult {
        crud::create(&self.documents, collection_for(&alias.0)?, body.0).await
    }

    /// Delete several documents of a system collection
    #[oai(path = "/sys/:alias/batch-delete", method = "post", tag = "SysTags::System")]
    async fn batch_delete(&self, alias: Path<String>, body: Json<BatchDeleteRequest>) -> ApiResult {
        crud::batch_delete(&self.documents, collection_for(&alias.0)?, body.0).await
    }

    /// Fetch one document of a system collection
    #[oai(path = "/sys/:alias/:id", method = "get", tag = "SysTags::System")]
    async fn get(&self, alias: Path<String>, id: Path<String>) -> ApiResult {
        crud::get(&self.documents, collection_for(&alias.0)?, &id.0).await
    }

    /// Update a document of a system collection
    #[oai(path = "/sys/:alias/:id", method = "put", tag = "SysTags::System")]
    async fn update(&self, alias: Path<String>, id: Path<String>, body: Json<Value>) -> ApiResult {
        crud::update(&self.documents, collection_for(&alias.0)?, &id.0, body.0).await
    }

    /// Delete a document of a system collection
    #[oai(path = "/sys/:alias/:id", method = "delete", tag = "SysTags::System")]
    async fn delete(&self, alias: Path<String>, id: Path<String>) -> ApiResult {
        crud::delete(&self.documents, collection_for(&alias.0)?, &id.0).await
    }
}
