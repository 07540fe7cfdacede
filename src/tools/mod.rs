//! Retrieval tools the model can call.
//!
//! Each tool advertises a JSON schema, executes against the [`CourseIndex`]
//! and remembers the sources behind its most recent output so the caller can
//! show where an answer came from.
//!
//! [`CourseIndex`]: crate::index::CourseIndex

mod outline;
mod registry;
mod search;

pub use outline::CourseOutlineTool;
pub use registry::ToolRegistry;
pub use search::CourseSearchTool;

use crate::error::{CoursemateError, Result};
use crate::llm::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};

/// Where a piece of retrieved content came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Label such as `"Course Title - Lesson 2"`.
    pub text: String,
    /// Lesson or course link when known.
    pub url: Option<String>,
}

/// A tool callable by the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call this tool.
    fn name(&self) -> &str;

    /// Schema advertised to the model.
    fn definition(&self) -> ToolDefinition;

    /// Run the tool with the model-supplied input.
    async fn execute(&self, input: &Value) -> Result<String>;

    /// Sources produced by the most recent execution.
    fn last_sources(&self) -> Vec<Source> {
        Vec::new()
    }

    fn reset_sources(&self) {}
}

/// Latest batch of sources, shared between a tool and its readers.
#[derive(Debug, Default)]
pub(crate) struct SourceSlot(Mutex<Vec<Source>>);

impl SourceSlot {
    fn lock(&self) -> MutexGuard<'_, Vec<Source>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn replace(&self, sources: Vec<Source>) {
        *self.lock() = sources;
    }

    pub(crate) fn get(&self) -> Vec<Source> {
        self.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }
}

/// Read a required string field from tool input.
pub(crate) fn required_str<'a>(tool: &str, input: &'a Value, key: &str) -> Result<&'a str> {
    match input.get(key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(invalid(tool, format!("'{}' must be a string", key))),
        None => Err(invalid(tool, format!("missing required field '{}'", key))),
    }
}

/// Read an optional string field; `null` counts as absent.
pub(crate) fn optional_str<'a>(tool: &str, input: &'a Value, key: &str) -> Result<Option<&'a str>> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(invalid(tool, format!("'{}' must be a string", key))),
    }
}

/// Read an optional non-negative integer field; `null` counts as absent.
pub(crate) fn optional_u32(tool: &str, input: &Value, key: &str) -> Result<Option<u32>> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid(tool, format!("'{}' must be a non-negative integer", key))),
    }
}

fn invalid(tool: &str, message: String) -> CoursemateError {
    CoursemateError::InvalidToolInput {
        tool: tool.to_string(),
        message,
    }
}
