//! RAG (Retrieval-Augmented Generation) facade for course questions.
//!
//! Wires the course index, retrieval tools, agent loop and session history
//! together behind a single `query` call.

use crate::agent::{AgentLoop, ToolCallRecord};
use crate::config::{Prompts, Settings};
use crate::embedding::create_embedder;
use crate::error::Result;
use crate::index::CourseIndex;
use crate::llm::{AnthropicClient, LanguageModel};
use crate::session::SessionManager;
use crate::tools::{CourseOutlineTool, CourseSearchTool, Source, ToolRegistry};
use crate::vector_store::create_store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// Answer to a course question.
#[derive(Debug, Clone)]
pub struct RagResponse {
    /// The generated answer.
    pub answer: String,
    /// Sources cited by the tools during this query.
    pub sources: Vec<Source>,
    /// Tool calls the agent made.
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Summary of the indexed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseAnalytics {
    pub total_courses: usize,
    pub course_titles: Vec<String>,
}

/// Question answering over the course index.
pub struct RagSystem {
    index: Arc<CourseIndex>,
    agent: AgentLoop,
    tools: Mutex<ToolRegistry>,
    sessions: SessionManager,
    prompts: Prompts,
}

impl RagSystem {
    /// Build every collaborator from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store = create_store(settings)?;
        let embedder = create_embedder(&settings.embedding)?;
        let index = Arc::new(CourseIndex::new(store, embedder, &settings.search));
        let model: Arc<dyn LanguageModel> = Arc::new(AnthropicClient::from_settings(&settings.llm)?);
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        Ok(Self::new(index, model, settings).with_prompts(prompts))
    }

    /// Build a system around an existing index and model.
    pub fn new(index: Arc<CourseIndex>, model: Arc<dyn LanguageModel>, settings: &Settings) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(CourseSearchTool::new(index.clone())));
        tools.register(Arc::new(CourseOutlineTool::new(index.clone())));

        Self {
            index,
            agent: AgentLoop::new(model, &settings.llm, &settings.agent),
            tools: Mutex::new(tools),
            sessions: SessionManager::new(settings.session.max_history),
            prompts: Prompts::default(),
        }
    }

    /// Use custom prompts.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.agent = self.agent.with_system_prompt(prompts.agent_system());
        self.prompts = prompts;
        self
    }

    pub fn index(&self) -> &Arc<CourseIndex> {
        &self.index
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Answer a question, using and updating the session's history when given.
    #[instrument(skip(self, question))]
    pub async fn query(&self, question: &str, session_id: Option<&str>) -> Result<RagResponse> {
        let tools = self.tools.lock().await;
        tools.reset_sources();

        let history = session_id.and_then(|id| self.sessions.history(id));
        let prompt = self.prompts.agent_user(question);

        let response = self.agent.run(&prompt, history.as_deref(), Some(&*tools)).await?;

        let sources = tools.collect_sources();
        tools.reset_sources();
        drop(tools);

        if let Some(id) = session_id {
            self.sessions.add_exchange(id, question, &response.answer);
        }

        info!(
            model_calls = response.model_calls,
            sources = sources.len(),
            "Answered question"
        );

        Ok(RagResponse {
            answer: response.answer,
            sources,
            tool_calls: response.tool_calls,
        })
    }

    /// Number and titles of indexed courses.
    pub async fn course_analytics(&self) -> Result<CourseAnalytics> {
        let course_titles = self.index.course_titles().await?;
        Ok(CourseAnalytics {
            total_courses: course_titles.len(),
            course_titles,
        })
    }
}
