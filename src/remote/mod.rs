//! Remote document store seam
//!
//! Events live in a document database addressed as `collection/id`. The
//! repositories only need whole-collection reads, whole-document writes and
//! per-field mutations, so that is all this trait exposes.

use crate::error::AppResult;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod memory;

pub use memory::MemoryDocumentStore;

/// A document as returned by the store: its id plus its top-level fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    pub id: String,
    pub data: Map<String, Value>,
}

impl RemoteDocument {
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self { id: id.into(), data }
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.data.get(field).and_then(Value::as_i64)
    }

    /// String entries of an array field; other entry types are dropped.
    pub fn get_str_list(&self, field: &str) -> Vec<String> {
        match self.data.get(field) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// String-to-string entries of a map field; other value types are dropped.
    pub fn get_str_map(&self, field: &str) -> Vec<(String, String)> {
        match self.data.get(field) {
            Some(Value::Object(entries)) => entries
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    Set(Value),
    Delete,
    /// Appends the value unless an equal element is already present.
    ArrayUnion(Value),
    /// Removes every element equal to the value.
    ArrayRemove(Value),
    Increment(i64),
}

/// A single field mutation. `path` may be dotted to reach into nested maps,
/// e.g. `attendeeNames.<uid>`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub path: String,
    pub op: FieldOp,
}

impl FieldUpdate {
    pub fn set(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { path: path.into(), op: FieldOp::Set(value.into()) }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self { path: path.into(), op: FieldOp::Delete }
    }

    pub fn array_union(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { path: path.into(), op: FieldOp::ArrayUnion(value.into()) }
    }

    pub fn array_remove(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { path: path.into(), op: FieldOp::ArrayRemove(value.into()) }
    }

    pub fn increment(path: impl Into<String>, by: i64) -> Self {
        Self { path: path.into(), op: FieldOp::Increment(by) }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteEventStore: Send + Sync {
    async fn list_documents(&self, collection: &str) -> AppResult<Vec<RemoteDocument>>;

    /// Creates or fully overwrites a document.
    async fn set_document(&self, collection: &str, id: &str, data: Map<String, Value>) -> AppResult<()>;

    /// Applies `updates` in order to an existing document. Fails with
    /// `AppError::NotFound` when the document does not exist.
    async fn update_fields(&self, collection: &str, id: &str, updates: Vec<FieldUpdate>) -> AppResult<()>;

    /// Deleting a missing document is not an error.
    async fn delete_document(&self, collection: &str, id: &str) -> AppResult<()>;
}
