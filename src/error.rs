//! Error types for Coursemate.

use thiserror::Error;

/// Library-level error type for Coursemate operations.
#[derive(Error, Debug)]
pub enum CoursemateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM API returned {status}: {message}")]
    LlmApi { status: u16, message: String },

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid input for tool '{tool}': {message}")]
    InvalidToolInput { tool: String, message: String },

    #[error("Session error: {0}")]
    Session(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for Coursemate operations.
pub type Result<T> = std::result::Result<T, CoursemateError>;
