//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod courses;
mod outline;
mod search;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use courses::run_courses;
pub use outline::run_outline;
pub use search::run_search;

use crate::config::Settings;
use crate::embedding::create_embedder;
use crate::index::CourseIndex;
use crate::vector_store::create_store;
use std::sync::Arc;

/// Open the course index without an LLM client.
fn open_index(settings: &Settings) -> crate::error::Result<Arc<CourseIndex>> {
    let store = create_store(settings)?;
    let embedder = create_embedder(&settings.embedding)?;
    Ok(Arc::new(CourseIndex::new(store, embedder, &settings.search)))
}
