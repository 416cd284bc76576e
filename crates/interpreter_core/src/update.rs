use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::{check_file_type, AppState, Effect, IngestOutcome, Msg, ParseFailure, SubmitFailure};

pub const PARSE_FAILURE_MESSAGE: &str = "Could not read the uploaded CSV file.";

const ENGINE_STOPPED: &str = "engine stopped";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected { path } => {
            if let Err(failure) = check_file_type(&path) {
                engine_warn!("Rejected upload: {}", failure);
                vec![state.show_error(PARSE_FAILURE_MESSAGE)]
            } else {
                let ingest_id = state.ingestor.begin();
                engine_info!("Ingestion {} started for {:?}", ingest_id, path);
                state.mark_dirty();
                vec![Effect::ReadFile { ingest_id, path }]
            }
        }
        Msg::FileLoaded { ingest_id, result } => match state.ingestor.complete(ingest_id, result) {
            IngestOutcome::Stale => {
                engine_debug!("Dropping superseded ingestion {}", ingest_id);
                Vec::new()
            }
            IngestOutcome::Accepted { headers } => {
                engine_info!("Ingestion {} accepted with {} columns", ingest_id, headers.len());
                state.annotations.initialize_from(&headers);
                state.mark_dirty();
                Vec::new()
            }
            IngestOutcome::Rejected(failure) => {
                engine_warn!("Ingestion {} failed: {}", ingest_id, failure);
                vec![state.show_error(PARSE_FAILURE_MESSAGE)]
            }
        },
        Msg::FileRemoved => {
            if state.ingestor.remove() {
                state.annotations.clear();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::AnnotationEdited { header, text } => {
            if state.annotations.set_value(&header, text) {
                state.mark_dirty();
            } else {
                engine_debug!("Ignoring description for unknown column {:?}", header);
            }
            Vec::new()
        }
        Msg::HeaderRemoved { index, header } => {
            if state.annotations.remove_header(index, &header) {
                state.mark_dirty();
            } else {
                engine_debug!("No column {:?} at index {}", header, index);
            }
            Vec::new()
        }
        Msg::ModeSelected(mode) => {
            if state.mode != mode {
                state.mode = mode;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::AllowLoggingToggled => {
            state.allow_logging = !state.allow_logging;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubmitClicked { message } => state.begin_submission(message),
        Msg::SubmissionFinished {
            submission_id,
            result,
        } => state.finish_submission(submission_id, result),
        Msg::ErrorClearDue { ticket } => {
            if state.errors.expire(ticket) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::EngineStopped => {
            let mut effects = Vec::new();
            if let Some(ingest_id) = state.ingestor.pending_id() {
                engine_warn!("Engine stopped during ingestion {}", ingest_id);
                let (next, more) = update(
                    state,
                    Msg::FileLoaded {
                        ingest_id,
                        result: Err(ParseFailure::Unreadable(ENGINE_STOPPED.to_string())),
                    },
                );
                state = next;
                effects.extend(more);
            }
            if let Some(submission_id) = state.submission.in_flight() {
                engine_warn!("Engine stopped during submission {}", submission_id);
                let (next, more) = update(
                    state,
                    Msg::SubmissionFinished {
                        submission_id,
                        result: Err(SubmitFailure::TransportOrServer(ENGINE_STOPPED.to_string())),
                    },
                );
                state = next;
                effects.extend(more);
            }
            effects
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
