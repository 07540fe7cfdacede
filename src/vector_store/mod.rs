//! Vector store abstraction for Coursemate.
//!
//! Provides a trait-based interface for different vector database backends.
//! Records live in named collections and carry a JSON metadata map that can
//! be constrained with exact-match filters at query time.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::config::Settings;
use crate::error::{CoursemateError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Metadata attached to a stored record.
pub type Metadata = serde_json::Map<String, Value>;

/// A record stored in a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Identifier, unique within its collection.
    pub id: String,
    /// The text that was embedded.
    pub document: String,
    /// Arbitrary metadata used for filtering and display.
    pub metadata: Metadata,
    /// Embedding vector.
    pub embedding: Vec<f32>,
}

/// A query hit with its distance to the query embedding.
#[derive(Debug, Clone)]
pub struct Hit {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
    /// Cosine distance (lower is closer).
    pub distance: f32,
}

/// Exact-match metadata constraints, combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFilter {
    conditions: Vec<(String, Value)>,
}

impl MetadataFilter {
    /// Create an empty filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key` to equal `value`.
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((key.into(), value.into()));
        self
    }

    /// True if no condition has been added.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check whether a metadata map satisfies every condition.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.conditions
            .iter()
            .all(|(key, value)| metadata.get(key) == Some(value))
    }
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace records by id. Returns the number written.
    async fn upsert(&self, collection: &str, records: &[Record]) -> Result<usize>;

    /// Return up to `limit` records passing `filter`, nearest first.
    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<Hit>>;

    /// Fetch a record by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>>;

    /// All record ids in insertion order.
    async fn ids(&self, collection: &str) -> Result<Vec<String>>;

    /// Number of records in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Remove every record of a collection. Returns the number removed.
    async fn clear(&self, collection: &str) -> Result<usize>;
}

/// Build the vector store selected in the settings.
pub fn create_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    match settings.vector_store.provider.as_str() {
        "sqlite" => Ok(Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?)),
        "memory" => Ok(Arc::new(MemoryVectorStore::new())),
        other => Err(CoursemateError::Config(format!(
            "Unknown vector store provider: {}",
            other
        ))),
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cosine distance, `1 - similarity`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Filter, rank and truncate candidate records. Shared by every backend.
pub(crate) fn rank<I>(
    records: I,
    embedding: &[f32],
    limit: usize,
    filter: Option<&MetadataFilter>,
) -> Vec<Hit>
where
    I: IntoIterator<Item = Record>,
{
    if limit == 0 {
        return Vec::new();
    }

    let mut hits: Vec<Hit> = records
        .into_iter()
        .filter(|r| filter.map_or(true, |f| f.matches(&r.metadata)))
        .map(|r| Hit {
            distance: cosine_distance(embedding, &r.embedding),
            id: r.id,
            document: r.document,
            metadata: r.metadata,
        })
        .collect();

    // Stable sort keeps insertion order among equal distances
    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(limit);
    hits
}
