//! In-process document store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{new_document_id, Collection, Document, DocumentStore};
use crate::Result;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<(String, Document)>>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub async fn len(&self, collection: Collection) -> usize {
        self.collections.read().await.get(&collection).map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, collection: Collection) -> Result<Vec<(String, Document)>> {
        Ok(self.collections.read().await.get(&collection).cloned().unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn create(&self, collection: Collection, doc: Document) -> Result<String> {
        let id = new_document_id();
        self.collections.write().await.entry(collection).or_default().push((id.clone(), doc));
        Ok(id)
    }

    async fn merge(&self, collection: Collection, id: &str, patch: Document) -> Result<bool> {
        let mut guard = self.collections.write().await;
        let Some((_, body)) = guard.get_mut(&collection).and_then(|docs| docs.iter_mut().find(|(doc_id, _)| doc_id == id)) else {
            return Ok(false);
        };
        body.extend(patch);
        Ok(true)
    }

    async fn replace(&self, collection: Collection, id: &str, doc: Document) -> Result<bool> {
        let mut guard = self.collections.write().await;
        let Some((_, body)) = guard.get_mut(&collection).and_then(|docs| docs.iter_mut().find(|(doc_id, _)| doc_id == id)) else {
            return Ok(false);
        };
        *body = doc;
        Ok(true)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(&collection) else { return Ok(false) };
        let before = docs.len();
        docs.retain(|(doc_id, _)| doc_id != id);
        Ok(docs.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_merge_keeps_untouched_fields() {
        let store = MemoryStore::new();
        let id = store.create(Collection::Products, doc(json!({"name": "Sugar", "inStock": true}))).await.unwrap();
        assert!(store.merge(Collection::Products, &id, doc(json!({"inStock": false}))).await.unwrap());
        let stored = store.get(Collection::Products, &id).await.unwrap().unwrap();
        assert_eq!(stored["name"], "Sugar");
        assert_eq!(stored["inStock"], false);
    }

    #[tokio::test]
    async fn test_missing_ids_report_false() {
        let store = MemoryStore::new();
        assert!(!store.merge(Collection::Products, "nope", Document::new()).await.unwrap());
        assert!(!store.replace(Collection::Products, "nope", Document::new()).await.unwrap());
        assert!(!store.delete(Collection::Products, "nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_preserves_creation_order() {
        let store = MemoryStore::new();
        let a = store.create(Collection::Achievements, Document::new()).await.unwrap();
        let b = store.create(Collection::Achievements, Document::new()).await.unwrap();
        let ids: Vec<_> = store.list(Collection::Achievements).await.unwrap().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
