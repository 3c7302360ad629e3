use thiserror::Error;

/// Gemini API errors
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Request Error: {0}")]
    RequestError(String),

    #[error("Parsing Error: {0}")]
    ParsingError(String),

    #[error("HTTP Error: {status_code} - {message}")]
    HttpError { status_code: u16, message: String },

    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// Result type for Gemini operations
pub type GeminiResult<T> = Result<T, GeminiError>;

/// Failure to find runnable code in a response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No candidates, or the first candidate carries no content
    #[error("Unexpected response format or no content in response")]
    NoContent,

    /// No parts, or the first part carries no text
    #[error("No valid code found in response")]
    NoCode,

    /// Text is present but whitespace only
    #[error("Generated code is empty")]
    EmptyCode,
}

/// Script execution errors
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("script exited with status {code}: {stderr}")]
    Failed { code: i32, stderr: String },

    #[error("I/O error while running script: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything that can stop a generate-and-execute invocation
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("empty input")]
    EmptyInput,

    #[error("API key not provided. Set it explicitly, in the config file, or as the {env_var} environment variable.")]
    MissingApiKey { env_var: String },

    #[error("A generation is already in progress")]
    Busy,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("API request failed: {0}")]
    Transport(#[from] GeminiError),

    #[error("Error executing the script: {0}")]
    Execution(#[from] ExecutorError),
}

impl PipelineError {
    /// User errors are recoverable locally and surface as warnings; the rest
    /// are system errors.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PipelineError::EmptyInput
                | PipelineError::MissingApiKey { .. }
                | PipelineError::Busy
                | PipelineError::Extraction(_)
        )
    }
}
