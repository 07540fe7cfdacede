//! Shared fixtures: a scripted language model and a seeded course index.

#![allow(dead_code)]

use async_trait::async_trait;
use coursemate::config::SearchSettings;
use coursemate::embedding::KeywordEmbedder;
use coursemate::index::{Course, CourseChunk, CourseIndex, Lesson};
use coursemate::llm::{
    ContentBlock, LanguageModel, MessageContent, MessageRequest, MessageResponse, StopReason,
    Usage,
};
use coursemate::tools::Tool;
use coursemate::vector_store::MemoryVectorStore;
use coursemate::{CoursemateError, Result};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const COMPUTER_USE: &str = "Building Towards Computer Use with Anthropic";
pub const MCP: &str = "MCP: Build Rich-Context AI Apps with Anthropic";
pub const PROMPT_COMPRESSION: &str = "Prompt Compression and Query Optimization";

/// Replays canned responses and records every request it receives.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<MessageResponse>>>,
    requests: Mutex<Vec<MessageRequest>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<MessageResponse>) -> Arc<Self> {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(responses: Vec<Result<MessageResponse>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<MessageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn create_message(&self, request: &MessageRequest) -> Result<MessageResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CoursemateError::Llm("script exhausted".to_string())))
    }
}

fn response(content: Vec<ContentBlock>, stop_reason: StopReason) -> MessageResponse {
    MessageResponse {
        id: "msg_test".to_string(),
        model: "scripted".to_string(),
        content,
        stop_reason: Some(stop_reason),
        usage: Usage::default(),
    }
}

/// A final text answer.
pub fn text_response(text: &str) -> MessageResponse {
    response(
        vec![ContentBlock::Text {
            text: text.to_string(),
        }],
        StopReason::EndTurn,
    )
}

/// A response requesting the given `(id, name, input)` tool calls.
pub fn tool_use_response(calls: Vec<(&str, &str, Value)>) -> MessageResponse {
    let content = calls
        .into_iter()
        .map(|(id, name, input)| ContentBlock::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input,
        })
        .collect();
    response(content, StopReason::ToolUse)
}

/// Blocks of the message at `index` of a request.
pub fn blocks(request: &MessageRequest, index: usize) -> Vec<ContentBlock> {
    match &request.messages[index].content {
        MessageContent::Blocks(blocks) => blocks.clone(),
        MessageContent::Text(text) => panic!("expected blocks, got text {:?}", text),
    }
}

/// `(tool_use_id, content, is_error)` of every tool_result in a block list.
pub fn tool_results(blocks: &[ContentBlock]) -> Vec<(String, String, bool)> {
    blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Some((tool_use_id.clone(), content.clone(), is_error.unwrap_or(false))),
            _ => None,
        })
        .collect()
}

/// A tool that always fails.
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "search_course_content"
    }

    fn definition(&self) -> coursemate::llm::ToolDefinition {
        coursemate::llm::ToolDefinition {
            name: "search_course_content".to_string(),
            description: "always fails".to_string(),
            input_schema: serde_json::json!({"type": "object", "properties": {}, "required": []}),
        }
    }

    async fn execute(&self, _input: &Value) -> Result<String> {
        Err(CoursemateError::VectorStore("index unavailable".to_string()))
    }
}

pub fn search_settings(max_results: usize) -> SearchSettings {
    SearchSettings {
        max_results,
        course_match_max_distance: Some(0.9),
    }
}

fn lesson(number: u32, title: &str, slug: &str) -> Lesson {
    Lesson {
        lesson_number: number,
        title: title.to_string(),
        lesson_link: Some(format!("https://example.com/{}/lesson-{}", slug, number)),
    }
}

fn chunk(course: &str, lesson: Option<u32>, index: u32, content: &str) -> CourseChunk {
    CourseChunk {
        content: content.to_string(),
        course_title: course.to_string(),
        lesson_number: lesson,
        chunk_index: index,
    }
}

pub fn sample_courses() -> Vec<Course> {
    vec![
        Course {
            title: COMPUTER_USE.to_string(),
            instructor: Some("Colt Steele".to_string()),
            course_link: Some("https://example.com/computer-use".to_string()),
            lessons: vec![
                lesson(0, "Introduction", "computer-use"),
                lesson(1, "Overview", "computer-use"),
                lesson(2, "Working With The API", "computer-use"),
                lesson(3, "Computer Use In Action", "computer-use"),
            ],
        },
        Course {
            title: MCP.to_string(),
            instructor: Some("Elie Schoppik".to_string()),
            course_link: Some("https://example.com/mcp".to_string()),
            lessons: vec![
                lesson(0, "Introduction", "mcp"),
                lesson(1, "Why MCP", "mcp"),
                lesson(2, "MCP Architecture", "mcp"),
            ],
        },
        Course {
            title: PROMPT_COMPRESSION.to_string(),
            instructor: None,
            course_link: None,
            lessons: vec![
                Lesson {
                    lesson_number: 1,
                    title: "Compressing Prompts".to_string(),
                    lesson_link: None,
                },
                Lesson {
                    lesson_number: 0,
                    title: "Introduction".to_string(),
                    lesson_link: None,
                },
            ],
        },
    ]
}

pub fn sample_chunks() -> Vec<CourseChunk> {
    vec![
        chunk(COMPUTER_USE, Some(0), 0, "Welcome to the course. Computer use lets a model operate a computer by looking at screenshots and issuing mouse and keyboard actions."),
        chunk(COMPUTER_USE, Some(0), 1, "In this course you will see how computer use builds on the API, multimodal prompting and tool use."),
        chunk(COMPUTER_USE, Some(1), 2, "An overview of the model family and how to pick a model for computer use tasks."),
        chunk(COMPUTER_USE, Some(2), 3, "Making your first request: send a message with the SDK and read the response content blocks."),
        chunk(COMPUTER_USE, Some(3), 4, "Putting it together: the computer use agent loop takes a screenshot, decides on an action and repeats."),
        chunk(MCP, Some(0), 0, "The Model Context Protocol standardizes how applications provide context to language models."),
        chunk(MCP, Some(1), 1, "Why MCP: servers expose tools, resources and prompts that any client can reuse."),
        chunk(MCP, Some(2), 2, "MCP architecture: a host runs clients that each keep a connection to one server."),
        chunk(PROMPT_COMPRESSION, None, 0, "Course preface: long prompts cost tokens and latency."),
        chunk(PROMPT_COMPRESSION, Some(1), 1, "Prompt compression removes redundant tokens while keeping the meaning of the prompt."),
    ]
}

/// Index seeded with three courses and their chunks.
pub async fn sample_index(max_results: usize) -> Arc<CourseIndex> {
    let index = CourseIndex::new(
        Arc::new(MemoryVectorStore::new()),
        Arc::new(KeywordEmbedder::new(4096)),
        &search_settings(max_results),
    );

    for course in sample_courses() {
        index.add_course_metadata(&course).await.unwrap();
    }
    index.add_course_content(&sample_chunks()).await.unwrap();

    Arc::new(index)
}
