//! Pre-flight checks before expensive operations.
//!
//! Validates that required API keys are available before starting operations
//! that would otherwise fail midway.

use crate::config::{EmbeddingProvider, Settings};
use crate::error::{CoursemateError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Asking questions needs the LLM key and whatever the embedder needs.
    Ask,
    /// Search and outline lookups only need the embedder.
    Search,
    /// Listing courses touches only the local store.
    Catalog,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ask => {
            check_env_key(&settings.llm.api_key_env, "sk-ant-...")?;
            check_embedder(settings)?;
        }
        Operation::Search => check_embedder(settings)?,
        Operation::Catalog => {}
    }
    Ok(())
}

fn check_embedder(settings: &Settings) -> Result<()> {
    match settings.embedding.provider {
        EmbeddingProvider::OpenAI => check_env_key("OPENAI_API_KEY", "sk-..."),
        EmbeddingProvider::Keyword => Ok(()),
    }
}

/// Check that an API key environment variable is set and non-empty.
fn check_env_key(var: &str, example: &str) -> Result<()> {
    match std::env::var(var) {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(CoursemateError::Config(format!(
            "{} is empty. Set it with: export {}='{}'",
            var, var, example
        ))),
        Err(_) => Err(CoursemateError::Config(format!(
            "{} not set. Set it with: export {}='{}'",
            var, var, example
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_no_requirements() {
        assert!(check(Operation::Catalog, &Settings::default()).is_ok());
    }

    #[test]
    fn test_keyword_search_needs_no_key() {
        let mut settings = Settings::default();
        settings.embedding.provider = EmbeddingProvider::Keyword;
        assert!(check(Operation::Search, &settings).is_ok());
    }

    #[test]
    fn test_missing_key_is_reported() {
        let err = check_env_key("COURSEMATE_TEST_UNSET_KEY", "x").unwrap_err();
        assert!(err.to_string().contains("COURSEMATE_TEST_UNSET_KEY not set"));
    }
}
