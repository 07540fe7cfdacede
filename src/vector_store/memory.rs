//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{rank, Hit, MetadataFilter, Record, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory vector store. Each collection keeps records in insertion order.
#[derive(Debug, Default)]
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, collection: &str, records: &[Record]) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let store = collections.entry(collection.to_string()).or_default();

        for record in records {
            match store.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record.clone(),
                None => store.push(record.clone()),
            }
        }
        Ok(records.len())
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<Hit>> {
        let collections = self.collections.read().await;
        let Some(store) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(rank(store.iter().cloned(), embedding, limit, filter))
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|store| store.iter().find(|r| r.id == id).cloned()))
    }

    async fn ids(&self, collection: &str) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|store| store.iter().map(|r| r.id.clone()).collect())
            .unwrap_or_default())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map_or(0, Vec::len))
    }

    async fn clear(&self, collection: &str) -> Result<usize> {
        let mut collections = self.collections.write().await;
        Ok(collections.remove(collection).map_or(0, |store| store.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, lesson: u32, embedding: Vec<f32>) -> Record {
        Record {
            id: id.to_string(),
            document: format!("content of {}", id),
            metadata: json!({"course_title": "Course", "lesson_number": lesson})
                .as_object()
                .cloned()
                .unwrap(),
            embedding,
        }
    }

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        store
            .upsert(
                "content",
                &[
                    record("a", 0, vec![1.0, 0.0, 0.0]),
                    record("b", 1, vec![0.0, 1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        assert_eq!(store.count("content").await.unwrap(), 2);
        assert_eq!(store.count("catalog").await.unwrap(), 0);

        let hits = store.query("content", &[1.0, 0.0, 0.0], 10, None).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert!(hits[0].distance < hits[1].distance);

        let filter = MetadataFilter::new().eq("lesson_number", 1u32);
        let hits = store
            .query("content", &[1.0, 0.0, 0.0], 10, Some(&filter))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");

        let hits = store.query("content", &[1.0, 0.0, 0.0], 0, None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_keeps_order() {
        let store = MemoryVectorStore::new();
        store
            .upsert("c", &[record("x", 0, vec![1.0]), record("y", 0, vec![1.0])])
            .await
            .unwrap();
        store.upsert("c", &[record("x", 5, vec![1.0])]).await.unwrap();

        assert_eq!(store.ids("c").await.unwrap(), vec!["x", "y"]);
        let x = store.get("c", "x").await.unwrap().unwrap();
        assert_eq!(x.metadata["lesson_number"], json!(5));

        assert_eq!(store.clear("c").await.unwrap(), 2);
        assert!(store.get("c", "x").await.unwrap().is_none());
    }
}
