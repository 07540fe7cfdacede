//! Interactive chat command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RagSystem;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, mut settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.llm.model = model;
    }

    let system = RagSystem::from_settings(&settings)?;
    let mut session_id = system.sessions().create_session();

    println!("\n{}", style("Coursemate Chat").bold().cyan());
    println!(
        "{}\n",
        style("Type your questions, or 'exit' to quit. Use 'clear' to start a new conversation.")
            .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            session_id = system.sessions().create_session();
            Output::info("Conversation history cleared.");
            continue;
        }

        match system.query(input, Some(&session_id)).await {
            Ok(response) => {
                for call in &response.tool_calls {
                    let mark = if call.outcome.is_error() {
                        style("✗").red()
                    } else {
                        style("✓").green()
                    };
                    println!("{} {}", style(format!("  [{}]", call.name)).dim(), mark);
                }
                println!("\n{} {}\n", style("Coursemate:").cyan().bold(), response.answer);
                Output::sources(&response.sources);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
