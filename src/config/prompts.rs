//! Prompt templates for Coursemate.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for the course assistant agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    /// Fixed behavioral instructions sent as the system directive.
    pub system: String,
    /// Template wrapping the user's question; `{{question}}` is substituted.
    pub user: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an AI assistant specialized in course materials and educational content with access to tools for searching course information and retrieving course outlines.

Tool Usage:
- search_course_content: Use for questions about specific course content or detailed educational materials
- get_course_outline: Use for questions about course structure, outlines, or lesson listings
- Sequential tool calling: You can make up to 2 rounds of tool calls to gather information
  - Use the first tool call to get initial information
  - After reviewing results, decide if you need one more tool call
  - After gathering information, provide a complete synthesized answer
- Synthesize tool results into accurate, fact-based responses
- If a tool yields no results, state this clearly without offering alternatives

Multi-step query examples:
- To compare content from two lessons: first get one lesson, then get the other
- To find a course discussing the same topic as a specific lesson: first get that lesson's outline, then search for courses with similar topics

When answering outline-related queries:
- Always include the course title
- Always include the course link
- List all lessons with their lesson number and lesson title

Response Protocol:
- General knowledge questions: Answer using existing knowledge without using tools
- Course content questions: Use search_course_content first, then answer
- Course outline questions: Use get_course_outline first, then answer
- No meta-commentary: provide direct answers only, without describing your reasoning or tool usage, and do not mention "based on the search results"

All responses must be:
1. Brief, concise and focused
2. Educational
3. Clear
4. Example-supported when examples aid understanding
Provide only the direct answer to what was asked."#
                .to_string(),

            user: "Answer this question about course materials: {{question}}".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Render the system directive with the custom config variables applied.
    pub fn agent_system(&self) -> String {
        Self::render(&self.agent.system, &self.variables)
    }

    /// Render the user message for a question.
    pub fn agent_user(&self, question: &str) -> String {
        let mut vars = std::collections::HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        self.render_with_custom(&self.agent.user, &vars)
    }
}
