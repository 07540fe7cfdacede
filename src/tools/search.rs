//! Content search over course materials.

use super::{optional_str, optional_u32, required_str, Source, SourceSlot, Tool};
use crate::error::Result;
use crate::index::{CourseIndex, SearchResults};
use crate::llm::ToolDefinition;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

const NAME: &str = "search_course_content";

/// Semantic search over lesson content with optional course/lesson filters.
pub struct CourseSearchTool {
    index: Arc<CourseIndex>,
    sources: SourceSlot,
}

impl CourseSearchTool {
    pub fn new(index: Arc<CourseIndex>) -> Self {
        Self {
            index,
            sources: SourceSlot::default(),
        }
    }

    async fn format_results(&self, results: &SearchResults) -> Result<(String, Vec<Source>)> {
        let mut blocks = Vec::with_capacity(results.len());
        let mut sources = Vec::with_capacity(results.len());

        for (document, meta) in results.iter() {
            let label = match meta.lesson_number {
                Some(n) => format!("{} - Lesson {}", meta.course_title, n),
                None => meta.course_title.clone(),
            };

            let lesson_link = match meta.lesson_number {
                Some(n) => self.index.get_lesson_link(&meta.course_title, n).await?,
                None => None,
            };
            let url = match lesson_link {
                Some(link) => Some(link),
                None => self.index.get_course_link(&meta.course_title).await?,
            };

            blocks.push(format!("[{}]\n{}", label, document));
            sources.push(Source { text: label, url });
        }

        Ok((blocks.join("\n\n"), sources))
    }
}

fn no_content_message(course_name: Option<&str>, lesson_number: Option<u32>) -> String {
    let mut message = String::from("No relevant content found");
    if let Some(course) = course_name {
        message.push_str(&format!(" in course '{}'", course));
    }
    if let Some(lesson) = lesson_number {
        message.push_str(&format!(" in lesson {}", lesson));
    }
    message.push('.');
    message
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn name(&self) -> &str {
        NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_string(),
            description: "Search course materials with smart course name matching and lesson filtering"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    #[instrument(skip(self, input))]
    async fn execute(&self, input: &Value) -> Result<String> {
        self.sources.clear();

        let query = required_str(NAME, input, "query")?;
        let course_name = optional_str(NAME, input, "course_name")?;
        let lesson_number = optional_u32(NAME, input, "lesson_number")?;

        let results = self
            .index
            .search(query, course_name, lesson_number, None)
            .await?;

        if let Some(error) = &results.error {
            debug!("Search reported: {}", error);
            return Ok(error.clone());
        }

        if results.is_empty() {
            return Ok(no_content_message(course_name, lesson_number));
        }

        let (output, sources) = self.format_results(&results).await?;
        debug!("Returning {} results", sources.len());
        self.sources.replace(sources);
        Ok(output)
    }

    fn last_sources(&self) -> Vec<Source> {
        self.sources.get()
    }

    fn reset_sources(&self) {
        self.sources.clear();
    }
}
