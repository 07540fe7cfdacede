//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RagSystem;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    show_tools: bool,
    mut settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.llm.model = model;
    }

    let system = RagSystem::from_settings(&settings)?;
    let spinner = Output::spinner("Searching course materials...");

    match system.query(question, None).await {
        Ok(response) => {
            spinner.finish_and_clear();

            if show_tools && !response.tool_calls.is_empty() {
                Output::header("Tool calls");
                for call in &response.tool_calls {
                    let marker = if call.outcome.is_error() { " (failed)" } else { "" };
                    Output::list_item(&format!("{}{}", call, marker));
                }
            }

            println!("\n{}\n", response.answer);
            Output::sources(&response.sources);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
