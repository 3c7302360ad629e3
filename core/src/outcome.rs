use tracing::{error, info, warn};

use crate::errors::PipelineError;
use crate::executor::ExecutionReport;
use crate::pipeline::PipelineState;

pub const SUCCESS_MESSAGE: &str = "Script executed successfully";
pub const CONTEXT_CLEARED_MESSAGE: &str = "Context cleared";

/// How a message should be shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Result of one generate-and-execute invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success(String),
    UserError(String),
    SystemError(String),
}

impl ExecutionOutcome {
    pub fn success() -> Self {
        ExecutionOutcome::Success(SUCCESS_MESSAGE.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success(_))
    }

    pub fn message(&self) -> &str {
        match self {
            ExecutionOutcome::Success(message)
            | ExecutionOutcome::UserError(message)
            | ExecutionOutcome::SystemError(message) => message,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ExecutionOutcome::Success(_) => Severity::Info,
            ExecutionOutcome::UserError(_) => Severity::Warning,
            ExecutionOutcome::SystemError(_) => Severity::Error,
        }
    }

    /// Routes the message to the reporter channel matching its severity
    pub fn report(&self, reporter: &dyn Reporter) {
        match self.severity() {
            Severity::Info => reporter.info(self.message()),
            Severity::Warning => reporter.warning(self.message()),
            Severity::Error => reporter.error(self.message()),
        }
    }
}

impl From<PipelineError> for ExecutionOutcome {
    fn from(err: PipelineError) -> Self {
        if err.is_user_error() {
            ExecutionOutcome::UserError(err.to_string())
        } else {
            ExecutionOutcome::SystemError(err.to_string())
        }
    }
}

/// The host side of the pipeline: where messages, progress and script
/// output end up.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);

    fn state_changed(&self, _state: PipelineState) {}

    /// Called with the extracted code right before it runs
    fn generated_code(&self, _code: &str) {}

    fn script_output(&self, _report: &ExecutionReport) {}
}

/// Sends everything to `tracing`. Used when the host attaches no reporter.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        info!("{}", message);
    }

    fn warning(&self, message: &str) {
        warn!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }
}
