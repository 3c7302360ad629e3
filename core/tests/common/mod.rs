#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use studio_exec_core::errors::{ExecutorError, GeminiError};
use studio_exec_core::{
    ExecutionReport, Executor, GenerateContentRequest, GenerateContentResponse, Pipeline,
    PipelineState, Reporter, Severity, Transport,
};

/// Environment variable that no test ever sets
pub const UNSET_KEY_VAR: &str = "STUDIO_EXEC_TEST_NEVER_SET_KEY";

#[derive(Debug, Clone)]
pub struct SentRequest {
    pub model: String,
    pub api_key: String,
    pub request: GenerateContentRequest,
}

/// Replays queued replies in order and records what was sent
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<GenerateContentResponse, GeminiError>>>,
    sent: Mutex<Vec<SentRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, reply: Result<GenerateContentResponse, GeminiError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn reply_code(&self, code: &str) {
        self.reply(Ok(GenerateContentResponse::from_text(code)));
    }

    pub fn reply_json(&self, body: serde_json::Value) {
        self.reply(Ok(serde_json::from_value(body).unwrap()));
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        self.sent.lock().unwrap().push(SentRequest {
            model: model.to_string(),
            api_key: api_key.to_string(),
            request: request.clone(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GeminiError::RequestError("no scripted reply".to_string())))
    }
}

/// Records every script it is asked to run; optionally fails them all
#[derive(Default)]
pub struct RecordingExecutor {
    pub fail_with: Option<String>,
    ran: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(stderr: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(stderr.to_string()),
            ran: Mutex::new(Vec::new()),
        })
    }

    pub fn ran(&self) -> Vec<String> {
        self.ran.lock().unwrap().clone()
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn execute(&self, code: &str) -> Result<ExecutionReport, ExecutorError> {
        self.ran.lock().unwrap().push(code.to_string());
        match &self.fail_with {
            Some(stderr) => Err(ExecutorError::Failed {
                code: 1,
                stderr: stderr.clone(),
            }),
            None => Ok(ExecutionReport::default()),
        }
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub messages: Mutex<Vec<(Severity, String)>>,
    pub states: Mutex<Vec<PipelineState>>,
    pub code: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((Severity::Info, message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((Severity::Warning, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((Severity::Error, message.to_string()));
    }

    fn state_changed(&self, state: PipelineState) {
        self.states.lock().unwrap().push(state);
    }

    fn generated_code(&self, code: &str) {
        self.code.lock().unwrap().push(code.to_string());
    }
}

pub fn pipeline(transport: &Arc<ScriptedTransport>, executor: &Arc<RecordingExecutor>) -> Pipeline {
    Pipeline::new(transport.clone(), executor.clone()).with_api_key_env(UNSET_KEY_VAR)
}
