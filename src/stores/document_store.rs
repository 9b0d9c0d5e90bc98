use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::DocumentError;
use crate::providers::CryptoProvider;
use crate::stores::collection::{CollectionDescriptor, CollectionRegistry};
use crate::stores::page_offset;
use crate::types::db::document::{self, Entity as DocumentEntity};
use crate::types::internal::document::{
    CREATED_AT_FIELD, DeleteOutcome, Document, DocumentPage, Fields, ID_FIELD, UPDATED_AT_FIELD,
    timestamp,
};

/// Query keys that control paging and sorting rather than filtering
const RESERVED_QUERY_KEYS: &[&str] = &["pageNum", "pageSize", "sort", "order"];

/// Generic accessor over collections named at runtime
pub struct DocumentStore {
    db: DatabaseConnection,
    registry: CollectionRegistry,
    crypto: Arc<CryptoProvider>,
}

impl DocumentStore {
    /// Create a new DocumentStore
    ///
    /// # Arguments
    /// * `db` - The documents database connection
    /// * `registry` - Collection capabilities (credential hashing)
    /// * `crypto` - Password hashing for credential collections
    pub fn new(db: DatabaseConnection, registry: CollectionRegistry, crypto: Arc<CryptoProvider>) -> Self {
        Self { db, registry, crypto }
    }

    /// Get a handle scoped to one collection
    ///
    /// Unknown collections are valid and simply empty.
    pub fn for_collection(&self, name: &str) -> CollectionHandle<'_> {
        CollectionHandle {
            store: self,
            descriptor: self.registry.describe(name),
        }
    }
}

/// Operations on a single collection
pub struct CollectionHandle<'a> {
    store: &'a DocumentStore,
    descriptor: CollectionDescriptor,
}

impl CollectionHandle<'_> {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// List documents matching every filter, newest first
    ///
    /// Each filter value is a case-insensitive substring match against the
    /// string field of the same name. Paging and sorting keys and empty values
    /// are ignored. Page number and size below 1 are clamped to 1; a page that
    /// cannot be addressed is an `InvalidArgument`.
    pub async fn list(
        &self,
        filter: &HashMap<String, String>,
        page_num: u64,
        page_size: u64,
    ) -> Result<DocumentPage, InternalError> {
        let page_num = page_num.max(1);
        let page_size = page_size.max(1);
        let offset = page_offset(page_num, page_size).ok_or_else(|| {
            DocumentError::InvalidArgument(format!("page {} of size {} is out of range", page_num, page_size))
        })?;

        let mut query = DocumentEntity::find().filter(document::Column::Collection.eq(self.name()));

        for (key, value) in filter {
            if RESERVED_QUERY_KEYS.contains(&key.as_str()) || value.is_empty() {
                continue;
            }
            // A quote would break out of the JSON path
            if key.contains('"') {
                tracing::debug!("Ignoring filter key that cannot be addressed: {}", key);
                continue;
            }

            let path = format!("$.\"{}\"", key);
            query = query.filter(Expr::cust_with_values(
                "json_type(body, ?) = 'text' AND instr(LOWER(json_extract(body, ?)), LOWER(?)) > 0",
                [path.clone(), path, value.clone()],
            ));
        }

        let total = query
            .clone()
            .count(&self.store.db)
            .await
            .map_err(|e| InternalError::database("count_documents", e))?;

        let rows = query
            .order_by_desc(document::Column::Id)
            .offset(offset)
            .limit(page_size)
            .all(&self.store.db)
            .await
            .map_err(|e| InternalError::database("list_documents", e))?;

        let items = rows
            .into_iter()
            .map(|row| parse_body(&row.body))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DocumentPage {
            items,
            total,
            page_num,
            page_size,
        })
    }

    /// Fetch one document
    ///
    /// # Returns
    /// * `Ok(Some(Document))` - The document exists
    /// * `Ok(None)` - No document with that id in this collection
    /// * `Err(InternalError)` - Malformed id or storage failure
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Document>, InternalError> {
        validate_id(id)?;

        let row = self.find_row(id).await?;

        row.map(|row| parse_body(&row.body)).transpose()
    }

    /// Create a document with a fresh id and server timestamps
    ///
    /// A client supplied `_id` is ignored. Credential collections hash the
    /// credential field before storage.
    pub async fn create(&self, mut fields: Fields) -> Result<Document, InternalError> {
        fields.remove(ID_FIELD);
        self.hash_credential_on_create(&mut fields)?;

        let id = Uuid::now_v7().to_string();
        let now = timestamp(Utc::now());
        fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        fields.insert(CREATED_AT_FIELD.to_string(), Value::String(now.clone()));
        fields.insert(UPDATED_AT_FIELD.to_string(), Value::String(now.clone()));

        let doc = Document::from_fields(fields);
        self.insert_row(&id, &doc, now.clone(), now).await?;

        tracing::debug!("Created document {} in {}", id, self.name());
        Ok(doc)
    }

    /// Shallow-merge fields into an existing document
    ///
    /// `_id` is never changed. For credential collections a non-empty credential
    /// is hashed and an empty or missing one leaves the stored hash untouched.
    ///
    /// # Returns
    /// * `Ok(None)` - No such document
    pub async fn update(&self, id: &str, mut fields: Fields) -> Result<Option<Document>, InternalError> {
        validate_id(id)?;
        fields.remove(ID_FIELD);
        self.hash_credential_on_update(&mut fields)?;

        self.merge(id, fields).await
    }

    /// Delete one document
    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome, InternalError> {
        validate_id(id)?;

        let result = DocumentEntity::delete_many()
            .filter(document::Column::Collection.eq(self.name()))
            .filter(document::Column::Id.eq(id))
            .exec(&self.store.db)
            .await
            .map_err(|e| InternalError::database("delete_document", e))?;

        Ok(DeleteOutcome {
            deleted_count: result.rows_affected,
        })
    }

    /// Delete every listed document that exists
    pub async fn batch_delete(&self, ids: &[String]) -> Result<DeleteOutcome, InternalError> {
        for id in ids {
            validate_id(id)?;
        }

        let result = DocumentEntity::delete_many()
            .filter(document::Column::Collection.eq(self.name()))
            .filter(document::Column::Id.is_in(ids.iter().map(String::as_str)))
            .exec(&self.store.db)
            .await
            .map_err(|e| InternalError::database("batch_delete_documents", e))?;

        Ok(DeleteOutcome {
            deleted_count: result.rows_affected,
        })
    }

    /// Re-insert a previously deleted document exactly as it was
    ///
    /// Keeps `_id` and timestamps and never hashes. Fails with `Conflict` if a
    /// document with the same id already exists.
    pub async fn restore(&self, doc: Document) -> Result<Document, InternalError> {
        let id = doc
            .id()
            .ok_or_else(|| DocumentError::InvalidArgument("document has no _id".to_string()))?
            .to_string();
        validate_id(&id)?;

        if self.find_row(&id).await?.is_some() {
            return Err(DocumentError::Conflict {
                collection: self.name().to_string(),
                id,
            }
            .into());
        }

        let now = timestamp(Utc::now());
        let created_at = string_field(&doc, CREATED_AT_FIELD).unwrap_or_else(|| now.clone());
        let updated_at = string_field(&doc, UPDATED_AT_FIELD).unwrap_or(now);
        self.insert_row(&id, &doc, created_at, updated_at).await?;

        tracing::debug!("Restored document {} in {}", id, self.name());
        Ok(doc)
    }

    /// Shallow-merge previously captured fields back, without credential hashing
    pub async fn apply_snapshot(&self, id: &str, mut fields: Fields) -> Result<Option<Document>, InternalError> {
        validate_id(id)?;
        fields.remove(ID_FIELD);

        self.merge(id, fields).await
    }

    async fn merge(&self, id: &str, fields: Fields) -> Result<Option<Document>, InternalError> {
        let Some(row) = self.find_row(id).await? else {
            return Ok(None);
        };

        let mut merged = parse_body(&row.body)?.into_fields();
        merged.extend(fields);
        let now = timestamp(Utc::now());
        merged.insert(UPDATED_AT_FIELD.to_string(), Value::String(now.clone()));
        let doc = Document::from_fields(merged);

        let mut active: document::ActiveModel = row.into();
        active.body = Set(serialize_body(&doc)?);
        active.updated_at = Set(now);
        active
            .update(&self.store.db)
            .await
            .map_err(|e| InternalError::database("update_document", e))?;

        Ok(Some(doc))
    }

    async fn find_row(&self, id: &str) -> Result<Option<document::Model>, InternalError> {
        DocumentEntity::find_by_id((self.name().to_string(), id.to_string()))
            .one(&self.store.db)
            .await
            .map_err(|e| InternalError::database("find_document", e))
    }

    async fn insert_row(
        &self,
        id: &str,
        doc: &Document,
        created_at: String,
        updated_at: String,
    ) -> Result<(), InternalError> {
        let row = document::ActiveModel {
            collection: Set(self.name().to_string()),
            id: Set(id.to_string()),
            body: Set(serialize_body(doc)?),
            created_at: Set(created_at),
            updated_at: Set(updated_at),
        };

        row.insert(&self.store.db)
            .await
            .map_err(|e| InternalError::database("insert_document", e))?;

        Ok(())
    }

    fn hash_credential_on_create(&self, fields: &mut Fields) -> Result<(), InternalError> {
        let Some(field) = self.descriptor.credential_field.as_deref() else {
            return Ok(());
        };

        match fields.remove(field) {
            Some(Value::String(plain)) => {
                let hash = self.store.crypto.hash_password(&plain)?;
                fields.insert(field.to_string(), Value::String(hash));
            }
            Some(_) => {
                tracing::warn!("Dropping non-string {} on create in {}", field, self.name());
            }
            None => {}
        }

        Ok(())
    }

    fn hash_credential_on_update(&self, fields: &mut Fields) -> Result<(), InternalError> {
        let Some(field) = self.descriptor.credential_field.as_deref() else {
            return Ok(());
        };

        // Only a non-empty string replaces the stored hash
        if let Some(Value::String(plain)) = fields.remove(field) {
            if !plain.is_empty() {
                let hash = self.store.crypto.hash_password(&plain)?;
                fields.insert(field.to_string(), Value::String(hash));
            }
        }

        Ok(())
    }
}

fn validate_id(id: &str) -> Result<(), DocumentError> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| DocumentError::invalid_id(id))
}

fn string_field(doc: &Document, field: &str) -> Option<String> {
    doc.get(field).and_then(Value::as_str).map(str::to_string)
}

fn parse_body(body: &str) -> Result<Document, InternalError> {
    serde_json::from_str::<Document>(body).map_err(|e| InternalError::parse("document", e.to_string()))
}

fn serialize_body(doc: &Document) -> Result<String, InternalError> {
    serde_json::to_string(doc).map_err(|e| InternalError::parse("document", e.to_string()))
}
