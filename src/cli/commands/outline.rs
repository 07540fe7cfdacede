//! Outline command implementation.

use super::open_index;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::tools::{CourseOutlineTool, Tool};
use anyhow::Result;
use serde_json::json;

/// Print the outline of a course, resolving partial names.
pub async fn run_outline(course: &str, settings: Settings) -> Result<()> {
    preflight::check(Operation::Search, &settings)?;

    let tool = CourseOutlineTool::new(open_index(&settings)?);
    let outline = tool.execute(&json!({ "course_name": course })).await?;

    if outline.starts_with("No course found") {
        Output::warning(&outline);
    } else {
        println!("{}", outline);
    }

    Ok(())
}
