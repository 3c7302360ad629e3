use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use studio_exec_core::config::{StudioConfig, get_default_config_file};
use studio_exec_core::{Pipeline, Session};
use tracing::{debug, info};

mod app;
mod cli;
mod logging;
mod output;

use crate::app::Invocation;
use crate::cli::Args;
use crate::output::{TerminalReporter, print_models, print_usage_instructions};

const APP_NAME: &str = "studio-exec";

/// Main function - loads configuration, then runs one prompt or an interactive session
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse command-line arguments
    let args = Args::parse();

    logging::init_tracing(args.verbose);

    // Load a .env file so the API key variable can live there
    dotenvy::dotenv().ok();

    if args.list_models {
        print_models();
        return Ok(ExitCode::SUCCESS);
    }

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_default_config_file(APP_NAME)?,
    };
    let file_config = StudioConfig::load_from_file(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    debug!(path = %config_path.display(), "Loaded configuration");
    let config = file_config.merge(&args.config_overrides());

    let pipeline = Pipeline::from_config(&config).context("Failed to set up the pipeline")?;
    let mut session = Session::new(pipeline).with_reporter(Arc::new(TerminalReporter::new()));
    let invocation = Invocation {
        api_key: config.api_key.clone(),
        model: config.model_name().to_string(),
    };
    info!(model = %invocation.model, program = ?config.executor.program, "Session ready");

    if args.interactive {
        app::run_interactive(&mut session, &invocation).await?;
        Ok(ExitCode::SUCCESS)
    } else if let Some(prompt) = args.prompt.as_deref() {
        let outcome = app::run_single_prompt(&mut session, prompt, &invocation).await;
        Ok(if outcome.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    } else {
        // No prompt and not interactive, show usage
        print_usage_instructions();
        Ok(ExitCode::SUCCESS)
    }
}
