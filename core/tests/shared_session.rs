mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{RecordingExecutor, RecordingReporter, UNSET_KEY_VAR};
use studio_exec_core::errors::GeminiError;
use studio_exec_core::{
    ExecutionOutcome, GenerateContentRequest, GenerateContentResponse, Pipeline, Session,
    Severity, SharedSession, Transport,
};
use tokio::sync::Notify;

/// Holds every request until released
#[derive(Default)]
struct GatedTransport {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl Transport for GatedTransport {
    async fn send(
        &self,
        _model: &str,
        _api_key: &str,
        _request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(GenerateContentResponse::from_text("slow = True"))
    }
}

#[tokio::test]
async fn test_overlapping_generate_is_refused() {
    let transport = Arc::new(GatedTransport::default());
    let executor = RecordingExecutor::new();
    let reporter = RecordingReporter::new();
    let pipeline = Pipeline::new(transport.clone(), executor.clone()).with_api_key_env(UNSET_KEY_VAR);
    let shared = SharedSession::new(Session::new(pipeline).with_reporter(reporter.clone()));

    let first = {
        let shared = shared.clone();
        tokio::spawn(async move { shared.generate("first", Some("key"), "m").await })
    };
    transport.entered.notified().await;

    let second = shared.generate("second", Some("key"), "m").await;
    assert_eq!(
        second,
        ExecutionOutcome::UserError("A generation is already in progress".to_string())
    );
    assert!(!shared.reset_context());

    transport.release.notify_one();
    let first = first.await.unwrap();
    assert!(first.is_success());

    let history = shared.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history.turns()[0].text(), "first");
    assert_eq!(executor.ran(), vec!["slow = True".to_string()]);

    let warnings = reporter
        .messages()
        .into_iter()
        .filter(|(severity, _)| *severity == Severity::Warning)
        .count();
    assert_eq!(warnings, 2);
}
