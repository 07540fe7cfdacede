//! Course catalog and search result types.

use crate::error::{CoursemateError, Result};
use crate::vector_store::{Hit, Metadata};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A lesson within a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub lesson_number: u32,
    pub title: String,
    #[serde(default)]
    pub lesson_link: Option<String>,
}

/// Catalog entry for a course. The title is its unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub course_link: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Course {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            instructor: None,
            course_link: None,
            lessons: Vec::new(),
        }
    }

    pub fn lesson(&self, lesson_number: u32) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.lesson_number == lesson_number)
    }

    pub(crate) fn to_metadata(&self) -> Result<Metadata> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(CoursemateError::VectorStore(
                "Course did not serialize to an object".to_string(),
            )),
        }
    }

    pub(crate) fn from_metadata(metadata: Metadata) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(metadata))?)
    }
}

/// A chunk of course text, as handed over by ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseChunk {
    pub content: String,
    pub course_title: String,
    pub lesson_number: Option<u32>,
    pub chunk_index: u32,
}

impl CourseChunk {
    pub(crate) fn record_id(&self) -> String {
        format!("{}_{}", self.course_title.replace(' ', "_"), self.chunk_index)
    }

    pub(crate) fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            course_title: self.course_title.clone(),
            lesson_number: self.lesson_number,
            chunk_index: self.chunk_index,
        }
    }
}

/// Metadata stored alongside every content chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub course_title: String,
    pub lesson_number: Option<u32>,
    pub chunk_index: u32,
}

impl ChunkMetadata {
    pub(crate) fn to_metadata(&self) -> Result<Metadata> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(CoursemateError::VectorStore(
                "Chunk metadata did not serialize to an object".to_string(),
            )),
        }
    }
}

/// Ranked results of a content search.
///
/// `documents`, `metadata` and `distances` always have the same length. When
/// `error` is set they are empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub documents: Vec<String>,
    pub metadata: Vec<ChunkMetadata>,
    pub distances: Vec<f32>,
    pub error: Option<String>,
}

impl SearchResults {
    /// Zero matches, no error.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Empty results carrying a user-facing error message.
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub(crate) fn from_hits(hits: Vec<Hit>) -> Result<Self> {
        let mut results = Self::empty();
        for hit in hits {
            let meta: ChunkMetadata = serde_json::from_value(Value::Object(hit.metadata))
                .map_err(|e| {
                    CoursemateError::VectorStore(format!("Malformed chunk metadata: {}", e))
                })?;
            results.documents.push(hit.document);
            results.metadata.push(meta);
            results.distances.push(hit.distance);
        }
        Ok(results)
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Iterate `(document, metadata)` pairs, nearest first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChunkMetadata)> {
        self.documents
            .iter()
            .map(String::as_str)
            .zip(self.metadata.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_course_metadata_roundtrip_keeps_lessons() {
        let course = Course {
            title: "Intro".to_string(),
            instructor: Some("Ada".to_string()),
            course_link: None,
            lessons: vec![Lesson {
                lesson_number: 1,
                title: "Basics".to_string(),
                lesson_link: Some("https://example.com/1".to_string()),
            }],
        };

        let restored = Course::from_metadata(course.to_metadata().unwrap()).unwrap();
        assert_eq!(restored, course);
        assert_eq!(restored.lesson(1).unwrap().title, "Basics");
        assert!(restored.lesson(2).is_none());
    }

    #[test]
    fn test_chunk_metadata_keeps_missing_lesson_as_null() {
        let chunk = CourseChunk {
            content: "text".to_string(),
            course_title: "My Course".to_string(),
            lesson_number: None,
            chunk_index: 3,
        };
        let meta = chunk.metadata().to_metadata().unwrap();

        assert_eq!(meta["lesson_number"], Value::Null);
        assert_eq!(meta["chunk_index"], json!(3));
        assert_eq!(chunk.record_id(), "My_Course_3");
    }

    #[test]
    fn test_error_results_are_empty() {
        let results = SearchResults::with_error("No course found matching 'x'");
        assert!(results.is_empty());
        assert_eq!(results.len(), 0);
        assert!(SearchResults::empty().error.is_none());
    }
}
