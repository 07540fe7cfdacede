//! Courses command implementation.

use super::open_index;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// List indexed courses.
pub async fn run_courses(settings: Settings) -> Result<()> {
    let index = open_index(&settings)?;

    let titles = match index.course_titles().await {
        Ok(titles) => titles,
        Err(e) => {
            Output::error(&format!("Failed to list courses: {}", e));
            return Err(e.into());
        }
    };

    if titles.is_empty() {
        Output::info("No courses indexed yet.");
        return Ok(());
    }

    Output::header(&format!("Indexed Courses ({})", titles.len()));
    println!();
    for title in &titles {
        match index.get_course(title).await? {
            Some(course) => Output::list_item(&format!(
                "{} ({} lessons)",
                course.title,
                course.lessons.len()
            )),
            None => Output::list_item(title),
        }
    }

    Ok(())
}
