//! Search command implementation.

use super::open_index;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    course: Option<&str>,
    lesson: Option<u32>,
    limit: Option<usize>,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Search, &settings)?;

    let index = open_index(&settings)?;
    let spinner = Output::spinner("Searching...");
    let results = index.search(query, course, lesson, limit).await;
    spinner.finish_and_clear();

    let results = match results {
        Ok(results) => results,
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    };

    if let Some(error) = &results.error {
        Output::warning(error);
        return Ok(());
    }

    if results.is_empty() {
        Output::warning("No results found matching your query.");
        return Ok(());
    }

    Output::success(&format!("Found {} results", results.len()));
    for ((document, meta), distance) in results.iter().zip(&results.distances) {
        let (label, url) = match meta.lesson_number {
            Some(n) => (
                format!("{} - Lesson {}", meta.course_title, n),
                index.get_lesson_link(&meta.course_title, n).await?,
            ),
            None => (meta.course_title.clone(), None),
        };
        Output::search_result(&label, *distance, document, url.as_deref());
    }

    Ok(())
}
