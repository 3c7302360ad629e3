//! Running generated code.
//!
//! Generated code runs with the full permissions of the user who started
//! the host. Nothing is sandboxed: the tool is meant for a single trusted
//! user driving their own machine. Anything that needs isolation should
//! provide its own [`Executor`] (container, restricted interpreter, remote
//! runner) and hand it to the pipeline instead of [`ScriptExecutor`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::{ExecutorConfig, DEFAULT_PROGRAM};
use crate::errors::ExecutorError;

/// What a finished script left behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs a piece of generated code to completion
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, code: &str) -> Result<ExecutionReport, ExecutorError>;
}

/// How the code reaches the interpreter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeDelivery {
    /// Appended as the last command-line argument (`python3 -c <code>`)
    Argument,
    /// Written to the interpreter's standard input
    #[default]
    Stdin,
}

/// Executes code by handing it to an interpreter in a child process
#[derive(Debug, Clone)]
pub struct ScriptExecutor {
    program: String,
    args: Vec<String>,
    delivery: CodeDelivery,
    working_dir: Option<PathBuf>,
}

impl ScriptExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            delivery: CodeDelivery::default(),
            working_dir: None,
        }
    }

    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self {
            program: config
                .program
                .clone()
                .unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
            args: config.args.clone().unwrap_or_default(),
            delivery: config.delivery.unwrap_or_default(),
            working_dir: config.working_dir.clone(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_delivery(mut self, delivery: CodeDelivery) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Executor for ScriptExecutor {
    async fn execute(&self, code: &str) -> Result<ExecutionReport, ExecutorError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if self.delivery == CodeDelivery::Argument {
            cmd.arg(code);
        }
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(match self.delivery {
            CodeDelivery::Stdin => Stdio::piped(),
            CodeDelivery::Argument => Stdio::null(),
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        debug!(program = %self.program, delivery = ?self.delivery, "Launching script");
        let mut child = cmd.spawn().map_err(|source| ExecutorError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // Feed stdin while draining stdout and stderr, otherwise a script
        // that prints more than a pipe buffer blocks both sides.
        let stdin = child.stdin.take();
        // Dropping the handle at the end closes the pipe so the interpreter sees EOF
        let feed = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            match stdin.write_all(code.as_bytes()).await {
                // The interpreter stopped reading; its exit status decides
                Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        let report = ExecutionReport {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !output.status.success() {
            return Err(ExecutorError::Failed {
                code: report.exit_code,
                stderr: report.stderr.trim().to_string(),
            });
        }
        fed?;

        Ok(report)
    }
}
