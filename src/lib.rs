//! Coursemate - Question answering over course materials
//!
//! Answers questions about a library of courses by letting a language model
//! call retrieval tools (content search and outline lookup) for a bounded
//! number of rounds before it replies.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `index` - Course catalog and content search with fuzzy course names
//! - `tools` - Retrieval tools and the tool registry
//! - `llm` - Language model client
//! - `agent` - Bounded tool-calling loop
//! - `session` - Conversation history
//! - `rag` - Facade tying everything together
//!
//! # Example
//!
//! ```rust,no_run
//! use coursemate::config::Settings;
//! use coursemate::rag::RagSystem;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let system = RagSystem::from_settings(&settings)?;
//!
//!     let response = system.query("What is covered in lesson 1 of the MCP course?", None).await?;
//!     println!("{}", response.answer);
//!     for source in &response.sources {
//!         println!("- {}", source.text);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod llm;
pub mod rag;
pub mod session;
pub mod tools;
pub mod vector_store;

pub use error::{CoursemateError, Result};
