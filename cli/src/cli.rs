use clap::Parser;
use clap::builder::PossibleValuesParser;
use std::path::PathBuf;
use studio_exec_core::config::{AVAILABLE_MODELS, ExecutorConfig, StudioConfig};
use studio_exec_core::executor::CodeDelivery;

/// Generate scripts from prompts with the Gemini API and run them
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The prompt describing the change to make
    #[arg(index = 1)] // Positional argument
    pub prompt: Option<String>,

    /// Enter interactive mode; the conversation carries over between prompts
    #[arg(short, long, default_value_t = false)]
    pub interactive: bool,

    /// API key (falls back to the config file, then the environment)
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Model to generate with
    #[arg(short, long, value_parser = PossibleValuesParser::new(AVAILABLE_MODELS.iter().copied()))]
    pub model: Option<String>,

    /// Path to the config file
    #[arg(short, long, env = "STUDIO_EXEC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interpreter that runs the generated code
    #[arg(long)]
    pub program: Option<String>,

    /// Argument passed to the interpreter before the code (repeatable)
    #[arg(long = "arg", allow_hyphen_values = true)]
    pub program_args: Vec<String>,

    /// Pass the code as the last argument instead of on stdin
    #[arg(long, default_value_t = false)]
    pub code_as_arg: bool,

    /// Give up on the API after this many seconds (default: wait forever)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Do not print generated code before running it
    #[arg(long, default_value_t = false)]
    pub no_echo: bool,

    /// List the selectable models and exit
    #[arg(long, default_value_t = false)]
    pub list_models: bool,

    /// Enable verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Command-line values as a config layer for `StudioConfig::merge`
    pub fn config_overrides(&self) -> StudioConfig {
        let mut overrides = StudioConfig::overrides();
        overrides.api_key = self.api_key.clone();
        overrides.model_name = self.model.clone();
        overrides.request_timeout_secs = self.timeout;
        if self.no_echo {
            overrides.echo_code = Some(false);
        }
        overrides.executor = ExecutorConfig {
            program: self.program.clone(),
            args: (!self.program_args.is_empty()).then(|| self.program_args.clone()),
            delivery: self.code_as_arg.then_some(CodeDelivery::Argument),
            working_dir: None,
        };
        overrides
    }
}
