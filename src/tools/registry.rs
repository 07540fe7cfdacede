//! Name-based tool dispatch.

use super::{Source, Tool};
use crate::error::{CoursemateError, Result};
use crate::llm::ToolDefinition;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Holds the tools offered to the model, in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A tool with the same name is replaced in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        } else {
            debug!(tool = %name, "Replaced registered tool");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    fn ordered(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.order.iter().filter_map(|name| self.tools.get(name))
    }

    /// Schemas of every registered tool.
    pub fn schemas(&self) -> Vec<ToolDefinition> {
        self.ordered().map(|t| t.definition()).collect()
    }

    /// Run the named tool.
    pub async fn invoke(&self, name: &str, input: &Value) -> Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| CoursemateError::UnknownTool(name.to_string()))?;

        info!(tool = %name, "Invoking tool");
        tool.execute(input).await
    }

    /// Sources of every tool's latest run, in registration order.
    pub fn collect_sources(&self) -> Vec<Source> {
        self.ordered().flat_map(|t| t.last_sources()).collect()
    }

    pub fn reset_sources(&self) {
        self.ordered().for_each(|t| t.reset_sources());
    }
}
