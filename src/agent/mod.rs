//! Agentic retrieval loop.
//!
//! Lets the model call the course retrieval tools for a bounded number of
//! rounds before it must answer.

mod runner;

pub use runner::{AgentLoop, AgentResponse, ToolCallRecord, ToolOutcome};
