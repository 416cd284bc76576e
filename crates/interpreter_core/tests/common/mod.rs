#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use interpreter_core::{
    update, AppState, AssistantReply, Effect, LoadedUpload, Msg, SubmissionId, SubmitFailure,
    UploadedFile,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

pub fn csv_bytes(rows: &[Vec<String>]) -> String {
    rows.iter().map(|row| row.join(",") + "\n").collect()
}

/// Selects `name` and delivers the given rows as the read result.
pub fn upload(state: AppState, name: &str, rows: Vec<Vec<String>>) -> AppState {
    let (state, effects) = update(
        state,
        Msg::FileSelected {
            path: PathBuf::from(name),
        },
    );
    let ingest_id = match effects.as_slice() {
        [Effect::ReadFile { ingest_id, .. }] => *ingest_id,
        other => panic!("expected a single ReadFile effect, got {other:?}"),
    };
    let file = UploadedFile::new(name, csv_bytes(&rows));
    let (state, _) = update(
        state,
        Msg::FileLoaded {
            ingest_id,
            result: Ok(LoadedUpload { file, rows }),
        },
    );
    state
}

pub fn with_table(headers: &[&str]) -> AppState {
    upload(
        AppState::new(),
        "data.csv",
        vec![row(headers), row(&vec!["1"; headers.len()])],
    )
}

pub fn submit(state: AppState, message: Option<&str>) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::SubmitClicked {
            message: message.map(ToOwned::to_owned),
        },
    )
}

pub fn sent_submission_id(effects: &[Effect]) -> SubmissionId {
    match effects {
        [Effect::SendSubmission { submission_id, .. }] => *submission_id,
        other => panic!("expected a single SendSubmission effect, got {other:?}"),
    }
}

pub fn reply(
    state: AppState,
    submission_id: SubmissionId,
    result: Result<AssistantReply, SubmitFailure>,
) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::SubmissionFinished {
            submission_id,
            result,
        },
    )
}

pub fn answer(text: &str) -> AssistantReply {
    AssistantReply {
        answer: text.to_string(),
        images: Vec::new(),
    }
}
