use std::fs;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use interpreter_engine::{
    AnalysisReply, EngineEvent, EngineHandle, FailureKind, ReadError, SubmissionRequest,
    SubmitError, SubmitSettings, Submitter,
};
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn next_event(engine: &EngineHandle) -> Option<EngineEvent> {
    let engine = engine.clone();
    tokio::task::spawn_blocking(move || engine.recv_timeout(Duration::from_secs(5)))
        .await
        .expect("join")
}

fn request() -> SubmissionRequest {
    SubmissionRequest {
        file_name: "data.csv".to_string(),
        file_bytes: Bytes::from_static(b"a\n1\n"),
        column_data: "{}".to_string(),
        messages: "[]".to_string(),
        model: "GPT-4".to_string(),
        allow_logging: true,
    }
}

struct EchoSubmitter;

#[async_trait::async_trait]
impl Submitter for EchoSubmitter {
    async fn submit(&self, request: SubmissionRequest) -> Result<AnalysisReply, SubmitError> {
        Ok(AnalysisReply {
            answer: request.model,
            images: Vec::new(),
        })
    }
}

/// Panics on requests for the "boom" model and echoes every other one.
struct FragileSubmitter;

#[async_trait::async_trait]
impl Submitter for FragileSubmitter {
    async fn submit(&self, request: SubmissionRequest) -> Result<AnalysisReply, SubmitError> {
        if request.model == "boom" {
            panic!("submitter blew up");
        }
        EchoSubmitter.submit(request).await
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn read_file_reports_loaded_table() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data.csv");
    fs::write(&path, "a,b\n1,2\n").unwrap();

    let engine = EngineHandle::with_submitter(Arc::new(EchoSubmitter));
    engine.read_file(4, &path).expect("engine running");

    match next_event(&engine).await {
        Some(EngineEvent::FileLoaded { ingest_id, result }) => {
            assert_eq!(ingest_id, 4);
            let table = result.expect("loaded");
            assert_eq!(table.file_name, "data.csv");
            assert_eq!(table.rows.len(), 2);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn submission_result_is_tagged_with_its_id() {
    let engine = EngineHandle::with_submitter(Arc::new(EchoSubmitter));
    engine.submit(9, request()).expect("engine running");

    match next_event(&engine).await {
        Some(EngineEvent::SubmissionCompleted {
            submission_id,
            result,
        }) => {
            assert_eq!(submission_id, 9);
            assert_eq!(result.expect("reply").answer, "GPT-4");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn http_submission_failure_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(413))
        .expect(1)
        .mount(&server)
        .await;

    let engine = EngineHandle::new(SubmitSettings {
        endpoint: server.uri(),
        ..SubmitSettings::default()
    })
    .expect("engine");
    engine.submit(1, request()).expect("engine running");

    match next_event(&engine).await {
        Some(EngineEvent::SubmissionCompleted { result, .. }) => {
            assert_eq!(result.unwrap_err().kind, FailureKind::HttpStatus(413));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn only_latest_error_clear_fires() {
    let engine = EngineHandle::with_submitter(Arc::new(EchoSubmitter));
    engine
        .schedule_error_clear(1, Duration::from_millis(200))
        .expect("engine running");
    engine
        .schedule_error_clear(2, Duration::from_millis(50))
        .expect("engine running");

    assert_eq!(
        next_event(&engine).await,
        Some(EngineEvent::ErrorClearDue { ticket: 2 })
    );

    let engine_for_wait = engine.clone();
    let late = tokio::task::spawn_blocking(move || {
        engine_for_wait.recv_timeout(Duration::from_millis(400))
    })
    .await
    .expect("join");
    assert_eq!(late, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn panicking_submission_still_completes_with_failure() {
    let engine = EngineHandle::with_submitter(Arc::new(FragileSubmitter));
    engine
        .submit(
            3,
            SubmissionRequest {
                model: "boom".to_string(),
                ..request()
            },
        )
        .expect("engine running");

    match next_event(&engine).await {
        Some(EngineEvent::SubmissionCompleted {
            submission_id,
            result,
        }) => {
            assert_eq!(submission_id, 3);
            assert_eq!(result.unwrap_err().kind, FailureKind::Network);
        }
        other => panic!("unexpected event {other:?}"),
    }

    engine.submit(4, request()).expect("engine running");
    match next_event(&engine).await {
        Some(EngineEvent::SubmissionCompleted {
            submission_id,
            result,
        }) => {
            assert_eq!(submission_id, 4);
            assert_eq!(result.expect("reply").answer, "GPT-4");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_file_reports_read_error() {
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::with_submitter(Arc::new(EchoSubmitter));
    engine
        .read_file(2, temp.path().join("absent.csv"))
        .expect("engine running");

    match next_event(&engine).await {
        Some(EngineEvent::FileLoaded { ingest_id, result }) => {
            assert_eq!(ingest_id, 2);
            assert!(matches!(result, Err(ReadError::Io { .. })));
        }
        other => panic!("unexpected event {other:?}"),
    }
}
