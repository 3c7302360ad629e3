use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use studio_exec_core::config::{AVAILABLE_MODELS, DEFAULT_MODEL};
use studio_exec_core::{ConversationHistory, ExecutionReport, PipelineState, Reporter};

/// Prints pipeline messages to the terminal, with a spinner while the API is working
#[derive(Default)]
pub struct TerminalReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_spinner(&self) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Generating script...");
        spinner.enable_steady_tick(Duration::from_millis(120));

        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.replace(spinner) {
                previous.finish_and_clear();
            }
        }
    }

    fn stop_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        }
    }
}

impl Reporter for TerminalReporter {
    fn info(&self, message: &str) {
        self.stop_spinner();
        println!("{} {}", "✔".green().bold(), message.green());
    }

    fn warning(&self, message: &str) {
        self.stop_spinner();
        eprintln!("{} {}", "Warning:".yellow().bold(), message.yellow());
    }

    fn error(&self, message: &str) {
        self.stop_spinner();
        eprintln!("{} {}", "Error:".red().bold(), message.red());
    }

    fn state_changed(&self, state: PipelineState) {
        match state {
            PipelineState::Sent => self.start_spinner(),
            _ => self.stop_spinner(),
        }
    }

    fn generated_code(&self, code: &str) {
        self.stop_spinner();
        println!("{}", "Generated script:".blue().bold());
        for line in code.lines() {
            println!("  {}", line.dimmed());
        }
        println!();
    }

    fn script_output(&self, report: &ExecutionReport) {
        if !report.stdout.is_empty() {
            print!("{}", report.stdout);
            if !report.stdout.ends_with('\n') {
                println!();
            }
        }
        if !report.stderr.is_empty() {
            eprint!("{}", report.stderr.yellow());
            if !report.stderr.ends_with('\n') {
                eprintln!();
            }
        }
    }
}

/// Show usage instructions when no prompt or action is provided
pub fn print_usage_instructions() {
    println!("{}", "Usage:".yellow().bold());
    println!("  {}", "studio-exec \"your prompt\"".green().bold());
    println!("    Generate a script for one prompt and run it");
    println!();
    println!("  {}", "studio-exec -i".green().bold());
    println!("    Start an interactive session that remembers earlier prompts");
    println!();
    println!("{}", "Options:".cyan());
    println!("  -k, --api-key <KEY>   API key (or set GOOGLE_AI_STUDIO_API_KEY)");
    println!("  -m, --model <MODEL>   Model to use (see --list-models)");
    println!("  --program <PROGRAM>   Interpreter for the generated code");
    println!("  --help                Show this help message");
    println!();
}

pub fn print_models() {
    println!("{}", "Available models:".cyan().bold());
    for model in AVAILABLE_MODELS {
        if *model == DEFAULT_MODEL {
            println!("  {} {}", model.green().bold(), "(default)".dimmed());
        } else {
            println!("  {}", model);
        }
    }
}

pub fn print_interactive_help() {
    println!("Type a prompt to generate and run a script.");
    println!(
        "  {}    forget the conversation so far",
        "/clear".cyan()
    );
    println!("  {}  show the turns sent with each request", "/history".cyan());
    println!("  {}     end the session", "exit".cyan());
    println!();
}

/// One line per turn: role and first line of text
pub fn print_history(history: &ConversationHistory) {
    if history.is_empty() {
        println!("{}", "History is empty.".dimmed());
        return;
    }
    for (i, turn) in history.iter().enumerate() {
        let first_line = turn.text().lines().next().unwrap_or_default();
        println!("  {:>3}. {:<5} {}", i + 1, turn.role().as_str().blue(), first_line);
    }
}
