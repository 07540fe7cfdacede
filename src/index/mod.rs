//! Course index on top of a vector store.
//!
//! Two collections are kept: `course_catalog` holds one record per course
//! (embedded by title, used to resolve fuzzy course names) and
//! `course_content` holds the chunked lesson text.

mod models;

pub use models::{ChunkMetadata, Course, CourseChunk, Lesson, SearchResults};

use crate::config::SearchSettings;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{MetadataFilter, Record, VectorStore};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Collection holding course catalog entries.
pub const CATALOG_COLLECTION: &str = "course_catalog";

/// Collection holding content chunks.
pub const CONTENT_COLLECTION: &str = "course_content";

/// Search adapter over the course catalog and content collections.
pub struct CourseIndex {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    max_results: usize,
    course_match_max_distance: Option<f32>,
}

impl CourseIndex {
    /// Create an index using the given backends and search settings.
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        settings: &SearchSettings,
    ) -> Self {
        Self {
            store,
            embedder,
            max_results: settings.max_results,
            course_match_max_distance: settings.course_match_max_distance,
        }
    }

    /// Configured upper bound on results per search.
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    fn effective_limit(&self, limit: Option<usize>) -> usize {
        match limit {
            Some(limit) => limit.min(self.max_results),
            None => self.max_results,
        }
    }

    /// Map a possibly partial course name to the closest catalog title.
    #[instrument(skip(self))]
    pub async fn resolve_course_name(&self, partial: &str) -> Result<Option<String>> {
        if self.store.count(CATALOG_COLLECTION).await? == 0 {
            debug!("Course catalog is empty");
            return Ok(None);
        }

        let embedding = self.embedder.embed(partial).await?;
        let hits = self
            .store
            .query(CATALOG_COLLECTION, &embedding, 1, None)
            .await?;

        let Some(best) = hits.into_iter().next() else {
            return Ok(None);
        };

        if let Some(max) = self.course_match_max_distance {
            if best.distance > max {
                debug!(
                    candidate = %best.id,
                    distance = best.distance,
                    "Closest course is too far from query"
                );
                return Ok(None);
            }
        }

        debug!(title = %best.id, distance = best.distance, "Resolved course name");
        Ok(Some(best.id))
    }

    /// Search content chunks, optionally restricted to a course and lesson.
    ///
    /// An unresolvable course name is reported through
    /// [`SearchResults::error`], not as an `Err`.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
        limit: Option<usize>,
    ) -> Result<SearchResults> {
        let course_title = match course_name {
            Some(name) => match self.resolve_course_name(name).await? {
                Some(title) => Some(title),
                None => {
                    return Ok(SearchResults::with_error(format!(
                        "No course found matching '{}'",
                        name
                    )))
                }
            },
            None => None,
        };

        let limit = self.effective_limit(limit);
        if limit == 0 {
            debug!("Effective limit is zero, skipping query");
            return Ok(SearchResults::empty());
        }

        let mut filter = MetadataFilter::new();
        if let Some(title) = &course_title {
            filter = filter.eq("course_title", title.as_str());
        }
        if let Some(lesson) = lesson_number {
            filter = filter.eq("lesson_number", lesson);
        }

        let embedding = self.embedder.embed(query).await?;
        let hits = self
            .store
            .query(
                CONTENT_COLLECTION,
                &embedding,
                limit,
                (!filter.is_empty()).then_some(&filter),
            )
            .await?;

        let results = SearchResults::from_hits(hits)?;
        debug!("Search returned {} chunks", results.len());
        Ok(results)
    }

    /// Fetch a catalog entry by exact title.
    pub async fn get_course(&self, title: &str) -> Result<Option<Course>> {
        match self.store.get(CATALOG_COLLECTION, title).await? {
            Some(record) => Ok(Some(Course::from_metadata(record.metadata)?)),
            None => Ok(None),
        }
    }

    pub async fn get_course_link(&self, title: &str) -> Result<Option<String>> {
        Ok(self.get_course(title).await?.and_then(|c| c.course_link))
    }

    pub async fn get_lesson_link(&self, title: &str, lesson_number: u32) -> Result<Option<String>> {
        Ok(self
            .get_course(title)
            .await?
            .and_then(|c| c.lesson(lesson_number).and_then(|l| l.lesson_link.clone())))
    }

    /// All course titles, in the order they were added.
    pub async fn course_titles(&self) -> Result<Vec<String>> {
        self.store.ids(CATALOG_COLLECTION).await
    }

    pub async fn course_count(&self) -> Result<usize> {
        self.store.count(CATALOG_COLLECTION).await
    }

    /// Add or replace a course catalog entry.
    #[instrument(skip(self, course), fields(title = %course.title))]
    pub async fn add_course_metadata(&self, course: &Course) -> Result<()> {
        let embedding = self.embedder.embed(&course.title).await?;
        let record = Record {
            id: course.title.clone(),
            document: course.title.clone(),
            metadata: course.to_metadata()?,
            embedding,
        };
        self.store.upsert(CATALOG_COLLECTION, &[record]).await?;
        info!("Indexed course with {} lessons", course.lessons.len());
        Ok(())
    }

    /// Add content chunks. Returns the number stored.
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    pub async fn add_course_content(&self, chunks: &[CourseChunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let records = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                Ok(Record {
                    id: chunk.record_id(),
                    document: chunk.content.clone(),
                    metadata: chunk.metadata().to_metadata()?,
                    embedding,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let stored = self.store.upsert(CONTENT_COLLECTION, &records).await?;
        info!("Indexed {} content chunks", stored);
        Ok(stored)
    }

    /// Remove every course and chunk.
    pub async fn clear(&self) -> Result<()> {
        let courses = self.store.clear(CATALOG_COLLECTION).await?;
        let chunks = self.store.clear(CONTENT_COLLECTION).await?;
        info!("Cleared {} courses and {} chunks", courses, chunks);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::KeywordEmbedder;
    use crate::vector_store::MemoryVectorStore;

    fn index(max_results: usize) -> CourseIndex {
        let settings = SearchSettings {
            max_results,
            ..SearchSettings::default()
        };
        CourseIndex::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(KeywordEmbedder::default()),
            &settings,
        )
    }

    fn chunk(course: &str, lesson: Option<u32>, index: u32, content: &str) -> CourseChunk {
        CourseChunk {
            content: content.to_string(),
            course_title: course.to_string(),
            lesson_number: lesson,
            chunk_index: index,
        }
    }

    #[test]
    fn test_effective_limit_is_capped() {
        let idx = index(5);
        assert_eq!(idx.effective_limit(None), 5);
        assert_eq!(idx.effective_limit(Some(3)), 3);
        assert_eq!(idx.effective_limit(Some(10)), 5);
        assert_eq!(index(0).effective_limit(Some(3)), 0);
    }

    #[tokio::test]
    async fn test_resolve_on_empty_catalog() {
        let idx = index(5);
        assert_eq!(idx.resolve_course_name("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_search_with_course_and_lesson() {
        let idx = index(5);
        idx.add_course_metadata(&Course::new("Rust Basics")).await.unwrap();
        idx.add_course_metadata(&Course::new("Cooking Pasta")).await.unwrap();
        idx.add_course_content(&[
            chunk("Rust Basics", Some(1), 0, "ownership and borrowing rules"),
            chunk("Rust Basics", Some(2), 1, "traits and generics with ownership"),
            chunk("Cooking Pasta", Some(1), 2, "boil water and add salt"),
        ])
        .await
        .unwrap();

        let results = idx
            .search("ownership", Some("rust"), Some(2), None)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results.metadata[0].course_title, "Rust Basics");
        assert_eq!(results.metadata[0].lesson_number, Some(2));

        assert_eq!(idx.course_titles().await.unwrap(), vec!["Rust Basics", "Cooking Pasta"]);
        idx.clear().await.unwrap();
        assert_eq!(idx.course_count().await.unwrap(), 0);
    }
}
