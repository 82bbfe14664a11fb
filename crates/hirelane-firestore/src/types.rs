//! Firestore REST API wire types and value conversions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FirestoreError, FirestoreResult};

/// Firestore document value types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    /// Firestore sends integers as strings.
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapValue {
    pub fields: Option<HashMap<String, Value>>,
}

/// Firestore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name.
    pub name: Option<String>,
    /// Document fields.
    pub fields: Option<HashMap<String, Value>>,
    /// Create time.
    pub create_time: Option<String>,
    /// Update time.
    pub update_time: Option<String>,
}

impl Document {
    /// Create a new document with the given fields.
    pub fn new(fields: HashMap<String, Value>) -> Self {
        Self {
            name: None,
            fields: Some(fields),
            create_time: None,
            update_time: None,
        }
    }

    /// The document id, i.e. the last segment of the resource name.
    pub fn doc_id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.rsplit('/').next())
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.fields.as_ref().and_then(|f| f.get(key))
    }

    /// Read a string field.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.field(key).and_then(String::from_firestore_value)
    }

    /// Read a string field, failing if absent or of the wrong kind.
    pub fn require_str(&self, key: &str) -> FirestoreResult<String> {
        self.get_str(key)
            .ok_or_else(|| FirestoreError::invalid_response(format!("missing field '{}'", key)))
    }

    /// Read an integer field.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.field(key).and_then(i64::from_firestore_value)
    }

    /// Read a boolean field.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.field(key).and_then(bool::from_firestore_value)
    }

    /// Read a timestamp field.
    pub fn get_time(&self, key: &str) -> Option<DateTime<Utc>> {
        self.field(key).and_then(DateTime::from_firestore_value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetDocumentsRequest {
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetDocumentsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<String>,
}

// ============================================================================
// Batch Write Types
// ============================================================================

/// A single write operation in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Write {
    /// Update or insert a document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<Document>,

    /// Delete a document by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,

    /// Field mask for partial updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_mask: Option<DocumentMask>,

    /// Precondition for the write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_document: Option<Precondition>,
}

impl Write {
    /// A delete of the named document.
    pub fn delete(full_name: String) -> Self {
        Self {
            update: None,
            delete: Some(full_name),
            update_mask: None,
            current_document: None,
        }
    }
}

/// Document field mask for partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMask {
    pub field_paths: Vec<String>,
}

/// Precondition for a write operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Precondition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// Batch write request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWriteRequest {
    pub writes: Vec<Write>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    pub update_time: Option<String>,
}

/// gRPC-style status of a single write in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub code: Option<i32>,
    pub message: Option<String>,
}

/// Batch write response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWriteResponse {
    pub write_results: Option<Vec<WriteResult>>,
    pub status: Option<Vec<Status>>,
}

impl BatchWriteResponse {
    /// Create an empty response for empty batch writes.
    pub fn empty() -> Self {
        Self {
            write_results: Some(vec![]),
            status: Some(vec![]),
        }
    }

    /// Check for partial failures in the batch response.
    pub fn check_for_errors(&self) -> FirestoreResult<()> {
        if let Some(statuses) = &self.status {
            for (i, status) in statuses.iter().enumerate() {
                if let Some(code) = status.code {
                    if code != 0 {
                        let msg = status.message.as_deref().unwrap_or("Unknown error");
                        return Err(FirestoreError::request_failed(format!(
                            "Batch write failed at index {}: {} (code {})",
                            i, msg, code
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Value Conversions
// ============================================================================

/// Convert a Rust value to a Firestore [`Value`].
pub trait ToFirestoreValue {
    fn to_firestore_value(&self) -> Value;
}

impl ToFirestoreValue for String {
    fn to_firestore_value(&self) -> Value {
        Value::StringValue(self.clone())
    }
}

impl ToFirestoreValue for &str {
    fn to_firestore_value(&self) -> Value {
        Value::StringValue(self.to_string())
    }
}

impl ToFirestoreValue for i64 {
    fn to_firestore_value(&self) -> Value {
        Value::IntegerValue(self.to_string())
    }
}

impl ToFirestoreValue for bool {
    fn to_firestore_value(&self) -> Value {
        Value::BooleanValue(*self)
    }
}

impl ToFirestoreValue for DateTime<Utc> {
    fn to_firestore_value(&self) -> Value {
        Value::TimestampValue(self.to_rfc3339())
    }
}

impl<T: ToFirestoreValue> ToFirestoreValue for Option<T> {
    fn to_firestore_value(&self) -> Value {
        match self {
            Some(v) => v.to_firestore_value(),
            None => Value::NullValue(()),
        }
    }
}

/// Convert a Firestore [`Value`] to a Rust type.
pub trait FromFirestoreValue: Sized {
    fn from_firestore_value(value: &Value) -> Option<Self>;
}

impl FromFirestoreValue for String {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::StringValue(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromFirestoreValue for i64 {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::IntegerValue(s) => s.parse().ok(),
            Value::DoubleValue(f) => Some(*f as i64),
            _ => None,
        }
    }
}

impl FromFirestoreValue for bool {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::BooleanValue(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromFirestoreValue for DateTime<Utc> {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::TimestampValue(s) => DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_serializes_with_firestore_tags() {
        let json = serde_json::to_value("hello".to_firestore_value()).unwrap();
        assert_eq!(json, serde_json::json!({ "stringValue": "hello" }));

        let json = serde_json::to_value(42i64.to_firestore_value()).unwrap();
        assert_eq!(json, serde_json::json!({ "integerValue": "42" }));

        let json = serde_json::to_value(false.to_firestore_value()).unwrap();
        assert_eq!(json, serde_json::json!({ "booleanValue": false }));
    }

    #[test]
    fn test_none_maps_to_null_value() {
        let value = (None as Option<String>).to_firestore_value();
        assert!(matches!(value, Value::NullValue(())));
        // And null round-trips as "absent" for typed reads.
        assert_eq!(String::from_firestore_value(&value), None);
    }

    #[test]
    fn test_doc_id_is_last_path_segment() {
        let doc = Document {
            name: Some("projects/p/databases/(default)/documents/jobs/j42".into()),
            fields: None,
            create_time: None,
            update_time: None,
        };
        assert_eq!(doc.doc_id(), Some("j42"));
    }

    #[test]
    fn test_typed_field_accessors() {
        let mut fields = HashMap::new();
        fields.insert("title".to_string(), "Backend Engineer".to_firestore_value());
        fields.insert("salary_min".to_string(), 50_000i64.to_firestore_value());
        fields.insert("is_closed".to_string(), true.to_firestore_value());
        let doc = Document::new(fields);

        assert_eq!(doc.get_str("title").as_deref(), Some("Backend Engineer"));
        assert_eq!(doc.get_i64("salary_min"), Some(50_000));
        assert_eq!(doc.get_bool("is_closed"), Some(true));
        assert!(doc.require_str("missing").is_err());
    }

    #[test]
    fn test_batch_write_error_detection() {
        let response: BatchWriteResponse = serde_json::from_value(serde_json::json!({
            "writeResults": [{}, {}],
            "status": [{ "code": 0 }, { "code": 6, "message": "ALREADY_EXISTS" }]
        }))
        .unwrap();
        assert!(response.check_for_errors().is_err());
        assert!(BatchWriteResponse::empty().check_for_errors().is_ok());
    }
}
