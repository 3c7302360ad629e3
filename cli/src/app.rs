use anyhow::{Context, Result};
use colored::*;
use std::io::{self, Write};
use studio_exec_core::{ExecutionOutcome, Session};
use tracing::{debug, info};

use crate::output::{print_history, print_interactive_help};

/// Explicit key and model for every prompt of a run
pub struct Invocation {
    pub api_key: Option<String>,
    pub model: String,
}

/// Generates and runs a script for one prompt
pub async fn run_single_prompt(
    session: &mut Session,
    prompt: &str,
    invocation: &Invocation,
) -> ExecutionOutcome {
    info!(model = %invocation.model, "Running single prompt");
    session
        .generate(prompt, invocation.api_key.as_deref(), &invocation.model)
        .await
}

/// Interactive loop; history carries over until `/clear`
pub async fn run_interactive(session: &mut Session, invocation: &Invocation) -> Result<()> {
    println!(
        "Interactive session with {}. Type 'exit' or 'quit' to end the session.",
        invocation.model.cyan()
    );
    print_interactive_help();

    loop {
        // Prompt for user input
        print!("{}: ", "You".green().bold());
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .context("Failed to read input")?;
        if read == 0 {
            // EOF
            println!();
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Check for exit command
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("Exiting session.");
            break;
        }

        match input {
            "/clear" => session.reset_context(),
            "/history" => print_history(session.history()),
            "/help" => print_interactive_help(),
            prompt => {
                debug!(turns = session.history().len(), "Sending prompt");
                session
                    .generate(prompt, invocation.api_key.as_deref(), &invocation.model)
                    .await;
            }
        }

        println!(); // Add spacing between interactions
    }

    Ok(())
}
