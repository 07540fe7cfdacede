//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! Metadata is stored as JSON text and filtered after loading the collection.

use super::{rank, Hit, Metadata, MetadataFilter, Record, VectorStore};
use crate::error::{CoursemateError, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS records (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        document TEXT NOT NULL,
        metadata TEXT NOT NULL,
        embedding BLOB NOT NULL,
        PRIMARY KEY (collection, id)
    );

    CREATE INDEX IF NOT EXISTS idx_records_collection ON records(collection);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| CoursemateError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn parse_metadata(json: &str) -> Metadata {
        serde_json::from_str(json).unwrap_or_default()
    }

    fn load_collection(conn: &Connection, collection: &str) -> Result<Vec<Record>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, document, metadata, embedding
            FROM records
            WHERE collection = ?1
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map(params![collection], |row| {
            let metadata: String = row.get(2)?;
            let embedding: Vec<u8> = row.get(3)?;
            Ok(Record {
                id: row.get(0)?,
                document: row.get(1)?,
                metadata: Self::parse_metadata(&metadata),
                embedding: Self::bytes_to_embedding(&embedding),
            })
        })?;

        Ok(rows.filter_map(|r| r.ok()).collect())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert(&self, collection: &str, records: &[Record]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for record in records {
            let metadata = serde_json::to_string(&record.metadata)?;
            tx.execute(
                r#"
                INSERT INTO records (collection, id, document, metadata, embedding)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(collection, id) DO UPDATE SET
                    document = excluded.document,
                    metadata = excluded.metadata,
                    embedding = excluded.embedding
                "#,
                params![
                    collection,
                    record.id,
                    record.document,
                    metadata,
                    Self::embedding_to_bytes(&record.embedding),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Upserted {} records into {}", records.len(), collection);
        Ok(records.len())
    }

    #[instrument(skip(self, embedding, filter))]
    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<Hit>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;
        let records = Self::load_collection(&conn, collection)?;
        let hits = rank(records, embedding, limit, filter);

        debug!("Found {} matching records", hits.len());
        Ok(hits)
    }

    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>> {
        let conn = self.lock()?;

        let record = conn.query_row(
            "SELECT id, document, metadata, embedding FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, id],
            |row| {
                let metadata: String = row.get(2)?;
                let embedding: Vec<u8> = row.get(3)?;
                Ok(Record {
                    id: row.get(0)?,
                    document: row.get(1)?,
                    metadata: Self::parse_metadata(&metadata),
                    embedding: Self::bytes_to_embedding(&embedding),
                })
            },
        );

        match record {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn ids(&self, collection: &str) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id FROM records WHERE collection = ?1 ORDER BY rowid")?;
        let rows = stmt.query_map(params![collection], |row| row.get(0))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    #[instrument(skip(self))]
    async fn clear(&self, collection: &str) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM records WHERE collection = ?1", params![collection])?;
        info!("Deleted {} records from {}", deleted, collection);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, lesson: Option<u32>, embedding: Vec<f32>) -> Record {
        Record {
            id: id.to_string(),
            document: format!("text {}", id),
            metadata: json!({"course_title": "Course", "lesson_number": lesson, "chunk_index": 0})
                .as_object()
                .cloned()
                .unwrap(),
            embedding,
        }
    }

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .upsert(
                "content",
                &[
                    record("a", Some(0), vec![1.0, 0.0, 0.0]),
                    record("b", None, vec![0.0, 1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let hits = store.query("content", &[1.0, 0.0, 0.0], 10, None).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert!(hits[0].distance.abs() < 0.001);

        let filter = MetadataFilter::new().eq("lesson_number", 0u32);
        let hits = store
            .query("content", &[0.0, 1.0, 0.0], 10, Some(&filter))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata["lesson_number"], json!(0));

        let b = store.get("content", "b").await.unwrap().unwrap();
        assert!(b.metadata["lesson_number"].is_null());
        assert_eq!(b.embedding, vec![0.0, 1.0, 0.0]);

        assert_eq!(store.ids("content").await.unwrap(), vec!["a", "b"]);
        assert_eq!(store.clear("content").await.unwrap(), 2);
        assert_eq!(store.count("content").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sqlite_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vectors.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            store
                .upsert("catalog", &[record("only", Some(1), vec![0.5, 0.5])])
                .await
                .unwrap();
        }

        let reopened = SqliteVectorStore::new(&path).unwrap();
        assert_eq!(reopened.count("catalog").await.unwrap(), 1);
        assert!(reopened.get("catalog", "only").await.unwrap().is_some());
    }
}
