//! Language model access.
//!
//! The agent loop talks to the model only through [`LanguageModel`], so the
//! HTTP client can be swapped for a scripted model in tests.

mod anthropic;
mod types;

pub use anthropic::AnthropicClient;
pub use types::{
    ContentBlock, Message, MessageContent, MessageRequest, MessageResponse, Role, StopReason,
    ToolChoice, ToolDefinition, Usage,
};

use crate::error::Result;
use async_trait::async_trait;

/// A chat model supporting tool use.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send one request and wait for the complete response.
    async fn create_message(&self, request: &MessageRequest) -> Result<MessageResponse>;
}
