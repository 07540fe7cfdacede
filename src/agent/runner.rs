//! Bounded tool-calling loop.

use crate::config::{AgentPrompts, AgentSettings, LlmSettings};
use crate::error::Result;
use crate::llm::{
    ContentBlock, LanguageModel, Message, MessageRequest, MessageResponse, ToolChoice,
};
use crate::tools::ToolRegistry;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Drives the model through at most `max_rounds` rounds of tool use, then
/// forces a final answer without tools.
pub struct AgentLoop {
    model: Arc<dyn LanguageModel>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    max_rounds: usize,
    system_prompt: String,
}

impl AgentLoop {
    /// Create a loop over the given model.
    pub fn new(model: Arc<dyn LanguageModel>, llm: &LlmSettings, agent: &AgentSettings) -> Self {
        Self {
            model,
            model_name: llm.model.clone(),
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
            max_rounds: agent.max_rounds,
            system_prompt: AgentPrompts::default().system,
        }
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the maximum number of tool rounds.
    pub fn with_max_rounds(mut self, max: usize) -> Self {
        self.max_rounds = max;
        self
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    fn system(&self, history: Option<&str>) -> String {
        match history {
            Some(history) => format!(
                "{}\n\nPrevious conversation:\n{}",
                self.system_prompt, history
            ),
            None => self.system_prompt.clone(),
        }
    }

    fn request(
        &self,
        system: &str,
        messages: &[Message],
        tools: Option<&ToolRegistry>,
    ) -> MessageRequest {
        let schemas = tools.filter(|t| !t.is_empty()).map(|t| t.schemas());
        MessageRequest {
            model: self.model_name.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: Some(system.to_string()),
            messages: messages.to_vec(),
            tool_choice: schemas.as_ref().map(|_| ToolChoice::Auto),
            tools: schemas,
        }
    }

    /// Answer `query`, optionally using the registry's tools.
    #[instrument(skip_all, fields(max_rounds = self.max_rounds))]
    pub async fn run(
        &self,
        query: &str,
        history: Option<&str>,
        tools: Option<&ToolRegistry>,
    ) -> Result<AgentResponse> {
        let system = self.system(history);
        let mut messages = vec![Message::user(query)];
        let mut tool_calls = Vec::new();
        let mut model_calls = 0;

        for round in 1..=self.max_rounds {
            debug!("Agent round {}", round);

            let request = self.request(&system, &messages, tools);
            let response = self.model.create_message(&request).await?;
            model_calls += 1;

            let registry = match tools {
                Some(registry) if response.wants_tools() => registry,
                _ => return Ok(AgentResponse::new(response.text(), round, model_calls, tool_calls)),
            };

            let uses = response.tool_uses();
            if uses.is_empty() {
                warn!("Model asked for tools without any tool_use block");
                return Ok(AgentResponse::new(response.text(), round, model_calls, tool_calls));
            }

            let results = self.execute_tools(registry, &response, &mut tool_calls).await;
            messages.push(Message::assistant_blocks(&response.content));
            messages.push(Message::user_blocks(results));
        }

        info!("Tool rounds exhausted, requesting final answer");
        let request = self.request(&system, &messages, None);
        let response = self.model.create_message(&request).await?;
        model_calls += 1;

        Ok(AgentResponse::new(
            response.text(),
            self.max_rounds,
            model_calls,
            tool_calls,
        ))
    }

    /// Run every tool_use block in order, returning one result block each.
    async fn execute_tools(
        &self,
        registry: &ToolRegistry,
        response: &MessageResponse,
        records: &mut Vec<ToolCallRecord>,
    ) -> Vec<ContentBlock> {
        let mut results = Vec::new();

        for (id, name, input) in response.tool_uses() {
            info!("Agent calling tool: {} with args: {}", name, input);

            let outcome = match registry.invoke(name, input).await {
                Ok(output) => ToolOutcome::Success(output),
                Err(e) => {
                    warn!(tool = %name, error = %e, "Tool execution failed");
                    ToolOutcome::Failure(format!("Error executing tool: {}", e))
                }
            };

            results.push(match &outcome {
                ToolOutcome::Success(output) => ContentBlock::tool_result(id, output.clone()),
                ToolOutcome::Failure(message) => ContentBlock::tool_error(id, message.clone()),
            });

            records.push(ToolCallRecord {
                tool_use_id: id.to_string(),
                name: name.to_string(),
                input: input.clone(),
                outcome,
            });
        }

        results
    }
}

/// Result of dispatching one tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(String),
    Failure(String),
}

impl ToolOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Success(s) | Self::Failure(s) => s,
        }
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final answer text.
    pub answer: String,
    /// Rounds used before the answer was produced.
    pub rounds: usize,
    /// Number of model calls made.
    pub model_calls: usize,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
}

impl AgentResponse {
    fn new(answer: String, rounds: usize, model_calls: usize, tool_calls: Vec<ToolCallRecord>) -> Self {
        Self {
            answer,
            rounds,
            model_calls,
            tool_calls,
        }
    }
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Id of the tool_use block, echoed in the result.
    pub tool_use_id: String,
    /// Name of the tool called.
    pub name: String,
    /// Input passed to the tool.
    pub input: Value,
    /// What the tool returned.
    pub outcome: ToolOutcome,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.input)
    }
}
