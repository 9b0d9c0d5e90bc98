// Types layer - All data structures
pub mod db;
pub mod dto;
pub mod internal;

use poem_openapi::payload::Json;

use crate::errors::ApiError;
use crate::types::dto::common::ApiEnvelope;

pub type ApiResult = Result<Json<ApiEnvelope>, ApiError>;
