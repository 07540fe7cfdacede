//! Course outline lookup.

use super::{required_str, Tool};
use crate::error::Result;
use crate::index::{Course, CourseIndex};
use crate::llm::ToolDefinition;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::fmt::Write;
use std::sync::Arc;
use tracing::instrument;

const NAME: &str = "get_course_outline";

/// Returns a course's title, link, instructor and lesson list.
pub struct CourseOutlineTool {
    index: Arc<CourseIndex>,
}

impl CourseOutlineTool {
    pub fn new(index: Arc<CourseIndex>) -> Self {
        Self { index }
    }
}

/// Render the outline text handed back to the model.
pub fn format_outline(course: &Course) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Course Title: {}", course.title);
    let _ = writeln!(
        out,
        "Course Link: {}",
        course.course_link.as_deref().unwrap_or("No link available")
    );
    if let Some(instructor) = &course.instructor {
        let _ = writeln!(out, "Instructor: {}", instructor);
    }

    let mut lessons: Vec<_> = course.lessons.iter().collect();
    lessons.sort_by_key(|l| l.lesson_number);

    let _ = write!(out, "Lessons ({} total):", lessons.len());
    for lesson in lessons {
        let _ = write!(out, "\nLesson {}: {}", lesson.lesson_number, lesson.title);
    }
    out
}

#[async_trait]
impl Tool for CourseOutlineTool {
    fn name(&self) -> &str {
        NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_string(),
            description: "Get the complete outline of a course: title, link, instructor and every lesson with its number and title"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Computer Use')"
                    }
                },
                "required": ["course_name"]
            }),
        }
    }

    #[instrument(skip(self, input))]
    async fn execute(&self, input: &Value) -> Result<String> {
        let course_name = required_str(NAME, input, "course_name")?;
        let not_found = || format!("No course found matching '{}'", course_name);

        let Some(title) = self.index.resolve_course_name(course_name).await? else {
            return Ok(not_found());
        };

        match self.index.get_course(&title).await? {
            Some(course) => Ok(format_outline(&course)),
            None => Ok(not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Lesson;

    #[test]
    fn test_format_outline_sorts_lessons() {
        let course = Course {
            title: "MCP".to_string(),
            instructor: Some("Elie".to_string()),
            course_link: None,
            lessons: vec![
                Lesson {
                    lesson_number: 2,
                    title: "Servers".to_string(),
                    lesson_link: None,
                },
                Lesson {
                    lesson_number: 1,
                    title: "Intro".to_string(),
                    lesson_link: None,
                },
            ],
        };

        assert_eq!(
            format_outline(&course),
            "Course Title: MCP\nCourse Link: No link available\nInstructor: Elie\n\
             Lessons (2 total):\nLesson 1: Intro\nLesson 2: Servers"
        );
    }
}
