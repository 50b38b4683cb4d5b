//! In-process document store with the managed backend's field semantics.
//! Used for offline development and as the backend in tests.

use super::{FieldOp, FieldUpdate, RemoteDocument, RemoteEventStore};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

type Collection = BTreeMap<String, Map<String, Value>>;

#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_document(&self, collection: &str, id: &str) -> Option<RemoteDocument> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| RemoteDocument::new(id, data.clone()))
    }

    pub async fn document_count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map(BTreeMap::len).unwrap_or(0)
    }
}

#[async_trait]
impl RemoteEventStore for MemoryDocumentStore {
    async fn list_documents(&self, collection: &str) -> AppResult<Vec<RemoteDocument>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| RemoteDocument::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn set_document(&self, collection: &str, id: &str, data: Map<String, Value>) -> AppResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn update_fields(&self, collection: &str, id: &str, updates: Vec<FieldUpdate>) -> AppResult<()> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| AppError::not_found(format!("document {}/{}", collection, id)))?;

        // Apply to a copy so a bad update leaves the document unchanged
        let mut updated = document.clone();
        for update in updates {
            apply_update(&mut updated, &update)?;
        }
        *document = updated;
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> AppResult<()> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

fn apply_update(document: &mut Map<String, Value>, update: &FieldUpdate) -> AppResult<()> {
    let segments: Vec<&str> = update.path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(AppError::invalid_input(format!("invalid field path '{}'", update.path)));
    }
    let (leaf, parents) = segments
        .split_last()
        .ok_or_else(|| AppError::invalid_input("empty field path"))?;

    // Walk to the map holding the leaf, creating intermediate maps on write
    let mut current = document;
    for segment in parents {
        if matches!(update.op, FieldOp::Delete) && !current.contains_key(*segment) {
            return Ok(());
        }
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if matches!(update.op, FieldOp::Delete) && !entry.is_object() {
            return Ok(());
        }
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
    }

    match &update.op {
        FieldOp::Set(value) => {
            current.insert(leaf.to_string(), value.clone());
        }
        FieldOp::Delete => {
            current.remove(*leaf);
        }
        FieldOp::ArrayUnion(value) => {
            let array = array_field(current, leaf);
            if !array.contains(value) {
                array.push(value.clone());
            }
        }
        FieldOp::ArrayRemove(value) => {
            array_field(current, leaf).retain(|item| item != value);
        }
        FieldOp::Increment(by) => {
            let next = match current.get(*leaf) {
                Some(Value::Number(n)) => match n.as_i64().and_then(|current| current.checked_add(*by)) {
                    Some(next) => Value::from(next),
                    // Past the i64 range the counter continues as a float
                    None => Value::from(n.as_f64().unwrap_or(0.0) + *by as f64),
                },
                // Missing or non-numeric fields start from zero
                _ => Value::from(*by),
            };
            current.insert(leaf.to_string(), next);
        }
    }
    Ok(())
}

/// Returns the array stored at `field`, replacing any non-array value.
fn array_field<'a>(map: &'a mut Map<String, Value>, field: &str) -> &'a mut Vec<Value> {
    let entry = map.entry(field.to_string()).or_insert_with(|| Value::Array(Vec::new()));
    if !entry.is_array() {
        *entry = Value::Array(Vec::new());
    }
    match entry {
        Value::Array(items) => items,
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    async fn seeded() -> MemoryDocumentStore {
        let store = MemoryDocumentStore::new();
        store
            .set_document("events", "e1", object(json!({"title": "Dawn", "participantsCount": 1, "attendees": ["u0"]})))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_list_documents_by_collection() {
        let store = seeded().await;
        store.set_document("users", "u1", Map::new()).await.unwrap();

        let events = store.list_documents("events").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "e1");
        assert!(store.list_documents("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let store = MemoryDocumentStore::new();
        let result = store
            .update_fields("events", "ghost", vec![FieldUpdate::increment("participantsCount", 1)])
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_array_union_is_idempotent() {
        let store = seeded().await;
        for _ in 0..2 {
            store
                .update_fields("events", "e1", vec![FieldUpdate::array_union("attendees", "u1")])
                .await
                .unwrap();
        }
        let doc = store.get_document("events", "e1").await.unwrap();
        assert_eq!(doc.get_str_list("attendees"), vec!["u0", "u1"]);
    }

    #[tokio::test]
    async fn test_array_remove_and_increment() {
        let store = seeded().await;
        store
            .update_fields(
                "events",
                "e1",
                vec![
                    FieldUpdate::array_remove("attendees", "u0"),
                    FieldUpdate::increment("participantsCount", -1),
                    FieldUpdate::increment("views", 3),
                ],
            )
            .await
            .unwrap();

        let doc = store.get_document("events", "e1").await.unwrap();
        assert!(doc.get_str_list("attendees").is_empty());
        assert_eq!(doc.get_i64("participantsCount"), Some(0));
        assert_eq!(doc.get_i64("views"), Some(3));
    }

    #[tokio::test]
    async fn test_nested_set_and_delete() {
        let store = seeded().await;
        store
            .update_fields("events", "e1", vec![FieldUpdate::set("attendeeNames.u1", "Ada")])
            .await
            .unwrap();
        let doc = store.get_document("events", "e1").await.unwrap();
        assert_eq!(doc.get_str_map("attendeeNames"), vec![("u1".to_string(), "Ada".to_string())]);

        store
            .update_fields(
                "events",
                "e1",
                vec![FieldUpdate::delete("attendeeNames.u1"), FieldUpdate::delete("missing.u1")],
            )
            .await
            .unwrap();
        let doc = store.get_document("events", "e1").await.unwrap();
        assert!(doc.get_str_map("attendeeNames").is_empty());
        assert!(!doc.data.contains_key("missing"));
    }

    #[tokio::test]
    async fn test_increment_past_i64_range_does_not_panic() {
        let store = MemoryDocumentStore::new();
        store
            .set_document("events", "e1", object(json!({"participantsCount": i64::MAX})))
            .await
            .unwrap();
        store
            .update_fields("events", "e1", vec![FieldUpdate::increment("participantsCount", 1)])
            .await
            .unwrap();

        let doc = store.get_document("events", "e1").await.unwrap();
        let count = &doc.data["participantsCount"];
        assert!(count.is_f64());
        assert!(count.as_f64().unwrap() >= i64::MAX as f64);
    }

    #[tokio::test]
    async fn test_delete_under_non_map_parent_is_noop() {
        let store = MemoryDocumentStore::new();
        store
            .set_document("events", "e1", object(json!({"attendeeNames": "legacy"})))
            .await
            .unwrap();
        store
            .update_fields("events", "e1", vec![FieldUpdate::delete("attendeeNames.u1")])
            .await
            .unwrap();

        let doc = store.get_document("events", "e1").await.unwrap();
        assert_eq!(doc.get_str("attendeeNames"), Some("legacy"));
    }

    #[tokio::test]
    async fn test_invalid_path_leaves_document_unchanged() {
        let store = seeded().await;
        let result = store
            .update_fields(
                "events",
                "e1",
                vec![FieldUpdate::set("title", "Dusk"), FieldUpdate::set("bad..path", 1)],
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let doc = store.get_document("events", "e1").await.unwrap();
        assert_eq!(doc.get_str("title"), Some("Dawn"));
    }

    #[tokio::test]
    async fn test_delete_document_is_idempotent() {
        let store = seeded().await;
        store.delete_document("events", "e1").await.unwrap();
        store.delete_document("events", "e1").await.unwrap();
        assert_eq!(store.document_count("events").await, 0);
    }
}
