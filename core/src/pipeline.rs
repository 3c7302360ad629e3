//! The generate-and-execute loop.
//!
//! A [`Pipeline`] holds the collaborators (transport, executor) and the
//! fixed settings; it keeps no conversation of its own. History lives in a
//! [`ConversationHistory`] that the caller owns and lends to each run, most
//! often through a [`Session`]. [`SharedSession`] wraps a session for hosts
//! that may fire a second invocation before the first one has finished.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::client::{GeminiClient, Transport};
use crate::config::{resolve_api_key, StudioConfig, DEFAULT_API_KEY_ENV, DEFAULT_HISTORY_WARN_CHARS};
use crate::errors::{GeminiResult, PipelineError};
use crate::executor::{ExecutionReport, Executor, ScriptExecutor};
use crate::extract::extract_code;
use crate::history::ConversationHistory;
use crate::outcome::{ExecutionOutcome, Reporter, TracingReporter, CONTEXT_CLEARED_MESSAGE};
use crate::request::{build_request, validate_prompt, DEFAULT_DIRECTIVE};

/// Where an invocation currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Building,
    Sent,
    Extracting,
    Executing,
    Succeeded,
    Failed,
}

pub struct Pipeline {
    transport: Arc<dyn Transport>,
    executor: Arc<dyn Executor>,
    directive: String,
    api_key_env: String,
    history_warn_chars: usize,
    echo_code: bool,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("api_key_env", &self.api_key_env)
            .field("history_warn_chars", &self.history_warn_chars)
            .field("echo_code", &self.echo_code)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(transport: Arc<dyn Transport>, executor: Arc<dyn Executor>) -> Self {
        Self {
            transport,
            executor,
            directive: DEFAULT_DIRECTIVE.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            history_warn_chars: DEFAULT_HISTORY_WARN_CHARS,
            echo_code: true,
        }
    }

    /// Wires a [`GeminiClient`] and a [`ScriptExecutor`] from configuration
    pub fn from_config(config: &StudioConfig) -> GeminiResult<Self> {
        let transport = Arc::new(GeminiClient::new(config)?);
        let executor = Arc::new(ScriptExecutor::from_config(&config.executor));

        let mut pipeline = Self::new(transport, executor)
            .with_api_key_env(config.api_key_env())
            .with_history_warn_chars(config.history_warn_chars())
            .with_echo_code(config.echo_code());
        if let Some(directive) = &config.directive {
            pipeline = pipeline.with_directive(directive.clone());
        }
        Ok(pipeline)
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = directive.into();
        self
    }

    pub fn with_api_key_env(mut self, env_var: impl Into<String>) -> Self {
        self.api_key_env = env_var.into();
        self
    }

    pub fn with_history_warn_chars(mut self, chars: usize) -> Self {
        self.history_warn_chars = chars;
        self
    }

    pub fn with_echo_code(mut self, echo: bool) -> Self {
        self.echo_code = echo;
        self
    }

    pub fn directive(&self) -> &str {
        &self.directive
    }

    /// Runs one invocation against `history` and reports how it ended.
    ///
    /// The user turn is appended before the request goes out and stays there
    /// whatever happens next. The model turn is appended only when the reply
    /// yields code, and stays even if that code then fails to run.
    pub async fn run(
        &self,
        history: &mut ConversationHistory,
        prompt: &str,
        api_key: Option<&str>,
        model: &str,
        reporter: &dyn Reporter,
    ) -> ExecutionOutcome {
        let outcome = match self.try_run(history, prompt, api_key, model, reporter).await {
            Ok(report) => {
                reporter.script_output(&report);
                reporter.state_changed(PipelineState::Succeeded);
                info!(turns = history.len(), "Generated script executed");
                ExecutionOutcome::success()
            }
            Err(err) => {
                reporter.state_changed(PipelineState::Failed);
                // The reporter owns user-facing output; these stay below the default filter
                if err.is_user_error() {
                    debug!(turns = history.len(), "Invocation cancelled: {}", err);
                } else {
                    info!(turns = history.len(), "Invocation failed: {}", err);
                }
                ExecutionOutcome::from(err)
            }
        };
        reporter.state_changed(PipelineState::Idle);
        outcome
    }

    async fn try_run(
        &self,
        history: &mut ConversationHistory,
        prompt: &str,
        api_key: Option<&str>,
        model: &str,
        reporter: &dyn Reporter,
    ) -> Result<ExecutionReport, PipelineError> {
        reporter.state_changed(PipelineState::Building);
        let prompt = validate_prompt(prompt)?;
        let api_key = resolve_api_key(api_key, &self.api_key_env).ok_or_else(|| {
            PipelineError::MissingApiKey {
                env_var: self.api_key_env.clone(),
            }
        })?;

        history.push_user(prompt);
        let request = build_request(&self.directive, history);
        self.flag_payload_size(request.text_len());

        reporter.state_changed(PipelineState::Sent);
        let response = self.transport.send(model, &api_key, &request).await?;
        debug!(?response, "API response");

        reporter.state_changed(PipelineState::Extracting);
        let code = extract_code(&response)?;
        history.push_model(code.as_str());
        if self.echo_code {
            reporter.generated_code(&code);
        }

        reporter.state_changed(PipelineState::Executing);
        let report = self.executor.execute(&code).await?;
        Ok(report)
    }

    // History is never trimmed; long conversations keep growing the payload.
    fn flag_payload_size(&self, chars: usize) {
        if chars > self.history_warn_chars {
            warn!(
                chars,
                threshold = self.history_warn_chars,
                "Request payload is large; clear the context to start a fresh conversation"
            );
        } else {
            debug!(chars, "Request payload size");
        }
    }
}

/// One conversation: a pipeline plus the history it builds up
pub struct Session {
    pipeline: Pipeline,
    history: ConversationHistory,
    reporter: Arc<dyn Reporter>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("pipeline", &self.pipeline)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            history: ConversationHistory::new(),
            reporter: Arc::new(TracingReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Generate code for `prompt`, run it, and report the outcome.
    ///
    /// A blank `api_key` falls back to the configured environment variable.
    pub async fn generate(
        &mut self,
        prompt: &str,
        api_key: Option<&str>,
        model: &str,
    ) -> ExecutionOutcome {
        let outcome = self
            .pipeline
            .run(
                &mut self.history,
                prompt,
                api_key,
                model,
                self.reporter.as_ref(),
            )
            .await;
        outcome.report(self.reporter.as_ref());
        outcome
    }

    /// Forget the conversation so far
    pub fn reset_context(&mut self) {
        self.history.clear();
        info!("Conversation history cleared");
        self.reporter.info(CONTEXT_CLEARED_MESSAGE);
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

/// Cloneable handle to a session that refuses overlapping invocations
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
    reporter: Arc<dyn Reporter>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        let reporter = Arc::clone(&session.reporter);
        Self {
            inner: Arc::new(Mutex::new(session)),
            reporter,
        }
    }

    /// Like [`Session::generate`], but a call made while another is still
    /// running returns a user error and leaves the history alone.
    pub async fn generate(
        &self,
        prompt: &str,
        api_key: Option<&str>,
        model: &str,
    ) -> ExecutionOutcome {
        let Ok(mut session) = self.inner.try_lock() else {
            let outcome = ExecutionOutcome::from(PipelineError::Busy);
            outcome.report(self.reporter.as_ref());
            return outcome;
        };
        session.generate(prompt, api_key, model).await
    }

    /// Returns false, without clearing anything, while a generation is running
    pub fn reset_context(&self) -> bool {
        match self.inner.try_lock() {
            Ok(mut session) => {
                session.reset_context();
                true
            }
            Err(_) => {
                self.reporter.warning(&PipelineError::Busy.to_string());
                false
            }
        }
    }

    /// Snapshot of the history, waiting for any running invocation to finish
    pub async fn history(&self) -> ConversationHistory {
        self.inner.lock().await.history().clone()
    }
}
