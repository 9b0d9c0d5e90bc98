use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::types::internal::document::Document;

/// Keys whose values never reach the audit log
pub const SENSITIVE_KEYS: &[&str] = &["password", "token", "refreshToken", "secret"];

pub const MASK: &str = "******";

pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// Maximum characters of serialized params kept in an entry
pub const PARAMS_LIMIT: usize = 2000;

/// Maximum characters of a serialized snapshot kept in an entry
pub const SNAPSHOT_LIMIT: usize = 5000;

/// Merge query parameters and request body into one params object
///
/// Body fields win over query fields of the same name. A body that is not a
/// JSON object is kept under the `body` key.
pub fn merge_params(query: &HashMap<String, String>, body: Option<Value>) -> Value {
    let mut merged: Map<String, Value> = query
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    match body {
        Some(Value::Object(fields)) => merged.extend(fields),
        Some(Value::Null) | None => {}
        Some(other) => {
            merged.insert("body".to_string(), other);
        }
    }

    Value::Object(merged)
}

/// Replace present, non-empty sensitive values with the mask, at any depth
pub fn mask_sensitive(value: &mut Value) {
    match value {
        Value::Object(fields) => {
            for (key, field) in fields.iter_mut() {
                if SENSITIVE_KEYS.contains(&key.as_str()) {
                    if is_present(field) {
                        *field = Value::String(MASK.to_string());
                    }
                } else {
                    mask_sensitive(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask_sensitive),
        _ => {}
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Cut a string to `limit` characters, appending the truncation marker when cut
pub fn truncate(text: String, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => {
            let mut cut = text[..byte_index].to_string();
            cut.push_str(TRUNCATION_MARKER);
            cut
        }
        None => text,
    }
}

/// Serialize, mask and truncate request params for an audit entry
pub fn redact_params(query: &HashMap<String, String>, body: Option<Value>) -> Option<String> {
    let mut params = merge_params(query, body);
    mask_sensitive(&mut params);

    match serde_json::to_string(&params) {
        Ok(serialized) => Some(truncate(serialized, PARAMS_LIMIT)),
        Err(e) => {
            tracing::warn!("Failed to serialize audit params: {}", e);
            None
        }
    }
}

/// Serialize and truncate a pre-mutation snapshot
///
/// Snapshots are stored unmasked so a rollback can restore them exactly.
pub fn serialize_snapshot(doc: &Document) -> Option<String> {
    match serde_json::to_string(doc) {
        Ok(serialized) => Some(truncate(serialized, SNAPSHOT_LIMIT)),
        Err(e) => {
            tracing::warn!("Failed to serialize snapshot: {}", e);
            None
        }
    }
}
