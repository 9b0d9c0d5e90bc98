use poem_openapi::Object;

/// Request body for batch deletion
#[derive(Object, Debug)]
pub struct BatchDeleteRequest {
    /// Identifiers of the documents to delete
    pub ids: Vec<String>,
}
