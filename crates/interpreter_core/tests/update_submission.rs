mod common;

use common::{answer, init_logging, reply, sent_submission_id, submit, with_table};
use interpreter_core::{
    update, AppState, AssistantReply, Effect, FailureReason, Message, Msg, SubmissionMode,
    SubmissionOutcome, SubmissionState, SubmitFailure, ERROR_VISIBLE_FOR,
    GENERIC_FAILURE_MESSAGE, NO_FILE_MESSAGE, PAYLOAD_TOO_LARGE_MESSAGE,
};
use pretty_assertions::assert_eq;

fn error_ticket(effects: &[Effect]) -> u64 {
    match effects {
        [Effect::ScheduleErrorClear { ticket, delay }] => {
            assert_eq!(*delay, ERROR_VISIBLE_FOR);
            *ticket
        }
        other => panic!("expected a single ScheduleErrorClear effect, got {other:?}"),
    }
}

#[test]
fn submit_without_file_reports_no_file_and_keeps_log() {
    init_logging();
    let (state, effects) = submit(AppState::new(), Some("hello"));

    error_ticket(&effects);
    assert!(state.conversation().is_empty());
    assert_eq!(state.submission().state(), &SubmissionState::Idle);
    let view = state.view();
    assert_eq!(view.error.as_deref(), Some(NO_FILE_MESSAGE));
    assert_eq!(
        view.last_outcome,
        Some(SubmissionOutcome::Failed(FailureReason::NoFile))
    );
}

#[test]
fn payload_carries_file_annotations_history_mode_and_consent() {
    init_logging();
    let state = with_table(&["Age", "City"]);
    let (state, _) = update(
        state,
        Msg::AnnotationEdited {
            header: "Age".to_string(),
            text: "in years".to_string(),
        },
    );
    let (state, _) = update(state, Msg::ModeSelected(SubmissionMode::Gpt35));
    let (state, _) = update(state, Msg::AllowLoggingToggled);
    let expected_bytes = state.uploaded_file().unwrap().bytes.clone();

    let (state, effects) = submit(state, Some("hello"));

    let payload = match effects.as_slice() {
        [Effect::SendSubmission { payload, .. }] => payload.clone(),
        other => panic!("unexpected effects {other:?}"),
    };
    assert_eq!(payload.file.name, "data.csv");
    assert_eq!(payload.file.bytes, expected_bytes);
    assert_eq!(payload.column_data, r#"{"Age":"in years","City":""}"#);
    assert_eq!(
        payload.messages,
        r#"[{"text":"hello","isUser":true,"images":[]}]"#
    );
    assert_eq!(payload.model, SubmissionMode::Gpt35);
    assert!(payload.allow_logging);
    assert!(state.view().is_submitting);
}

#[test]
fn success_appends_user_then_assistant() {
    init_logging();
    let state = with_table(&["Age", "City"]);
    let before = state.conversation().len();

    let (state, effects) = submit(state, Some("hello"));
    let id = sent_submission_id(&effects);
    assert_eq!(state.conversation().messages().last(), Some(&Message::user("hello")));

    let (state, effects) = reply(state, id, Ok(answer("hi")));

    assert!(effects.is_empty());
    assert_eq!(state.conversation().len(), before + 2);
    assert_eq!(
        state.conversation().messages(),
        [
            Message::user("hello"),
            Message::assistant("hi", Vec::new()),
        ]
    );
    assert_eq!(state.submission().state(), &SubmissionState::Idle);
    assert_eq!(state.view().last_outcome, Some(SubmissionOutcome::Succeeded));
}

#[test]
fn assistant_images_are_kept() {
    init_logging();
    let (state, effects) = submit(with_table(&["x"]), Some("plot it"));
    let id = sent_submission_id(&effects);

    let (state, _) = reply(
        state,
        id,
        Ok(AssistantReply {
            answer: "done".to_string(),
            images: vec!["iVBORw0KGgo=".to_string()],
        }),
    );

    let last = state.conversation().messages().last().unwrap();
    assert!(!last.is_user);
    assert_eq!(last.images, vec!["iVBORw0KGgo=".to_string()]);
}

#[test]
fn payload_too_large_rolls_back_and_expires_after_timeout() {
    init_logging();
    let (state, effects) = submit(with_table(&["Age"]), Some("first"));
    let (state, _) = reply(state, sent_submission_id(&effects), Ok(answer("ok")));
    let before = state.conversation().messages().to_vec();

    let (state, effects) = submit(state, Some("hello"));
    let (state, effects) = reply(
        state,
        sent_submission_id(&effects),
        Err(SubmitFailure::PayloadTooLarge),
    );

    let ticket = error_ticket(&effects);
    assert_eq!(state.conversation().messages(), before.as_slice());
    assert_eq!(state.view().error.as_deref(), Some(PAYLOAD_TOO_LARGE_MESSAGE));
    assert_eq!(state.submission().state(), &SubmissionState::Idle);

    let (state, _) = update(state, Msg::ErrorClearDue { ticket });
    assert!(!state.errors().is_visible());
    assert_eq!(state.view().error, None);
}

#[test]
fn transport_failure_uses_generic_message() {
    init_logging();
    let (state, effects) = submit(with_table(&["Age"]), Some("hello"));
    let (state, _) = reply(
        state,
        sent_submission_id(&effects),
        Err(SubmitFailure::TransportOrServer("status 500".to_string())),
    );

    assert!(state.conversation().is_empty());
    assert_eq!(state.view().error.as_deref(), Some(GENERIC_FAILURE_MESSAGE));
    assert_eq!(
        state.view().last_outcome,
        Some(SubmissionOutcome::Failed(FailureReason::TransportOrServer))
    );
}

#[test]
fn failure_without_new_message_does_not_roll_back_history() {
    init_logging();
    let (state, effects) = submit(with_table(&["Age"]), Some("q"));
    let (state, _) = reply(state, sent_submission_id(&effects), Ok(answer("a")));

    let (state, effects) = submit(state, None);
    let payload_messages = match effects.as_slice() {
        [Effect::SendSubmission { payload, .. }] => payload.messages.clone(),
        other => panic!("unexpected effects {other:?}"),
    };
    assert!(payload_messages.contains(r#""text":"a""#));

    let (state, _) = reply(
        state,
        sent_submission_id(&effects),
        Err(SubmitFailure::TransportOrServer("reset".to_string())),
    );
    assert_eq!(state.conversation().len(), 2);
}

#[test]
fn blank_message_is_treated_as_absent() {
    init_logging();
    let (state, effects) = submit(with_table(&["Age"]), Some("   "));
    sent_submission_id(&effects);
    assert!(state.conversation().is_empty());
}

#[test]
fn second_submit_while_sending_is_noop() {
    init_logging();
    let (state, first) = submit(with_table(&["Age"]), Some("one"));
    let (mut state, second) = submit(state, Some("two"));

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(state.conversation().messages(), [Message::user("one")]);
    assert!(state.consume_dirty());

    let (state, _) = reply(state, sent_submission_id(&first), Ok(answer("1")));
    assert_eq!(state.conversation().len(), 2);
    assert!(!state.view().is_submitting);
}

#[test]
fn completion_for_unknown_submission_is_ignored() {
    init_logging();
    let (state, effects) = submit(with_table(&["Age"]), Some("one"));
    let id = sent_submission_id(&effects);

    let (state, effects) = reply(state, id + 7, Err(SubmitFailure::PayloadTooLarge));
    assert!(effects.is_empty());
    assert_eq!(state.conversation().len(), 1);
    assert!(state.view().is_submitting);
}

#[test]
fn newer_error_supersedes_pending_clear() {
    init_logging();
    let (state, effects) = submit(AppState::new(), None);
    let first = error_ticket(&effects);

    let (state, effects) = submit(with_table_from(state), Some("hi"));
    let (state, effects) = reply(
        state,
        sent_submission_id(&effects),
        Err(SubmitFailure::PayloadTooLarge),
    );
    let second = error_ticket(&effects);
    assert_ne!(first, second);

    let (state, _) = update(state, Msg::ErrorClearDue { ticket: first });
    assert_eq!(state.view().error.as_deref(), Some(PAYLOAD_TOO_LARGE_MESSAGE));

    let (state, _) = update(state, Msg::ErrorClearDue { ticket: second });
    assert_eq!(state.view().error, None);
}

#[test]
fn submission_snapshot_survives_file_removal() {
    init_logging();
    let (state, effects) = submit(with_table(&["Age"]), Some("hello"));
    let snapshot = match effects.as_slice() {
        [Effect::SendSubmission { payload, .. }] => payload.file.clone(),
        other => panic!("unexpected effects {other:?}"),
    };

    let (state, _) = update(state, Msg::FileRemoved);
    assert!(state.uploaded_file().is_none());
    assert_eq!(snapshot.name, "data.csv");

    let (state, _) = reply(state, sent_submission_id(&effects), Ok(answer("hi")));
    assert_eq!(state.conversation().len(), 2);
}

fn with_table_from(state: AppState) -> AppState {
    common::upload(
        state,
        "data.csv",
        vec![common::row(&["Age"]), common::row(&["1"])],
    )
}

#[test]
fn replacement_upload_during_submission_keeps_sent_snapshot() {
    init_logging();
    let state = with_table(&["Age"]);
    let old_bytes = state.uploaded_file().unwrap().bytes.clone();
    let (state, effects) = submit(state, Some("hello"));
    let (submission_id, sent) = match effects.as_slice() {
        [Effect::SendSubmission {
            submission_id,
            payload,
        }] => (*submission_id, payload.file.clone()),
        other => panic!("unexpected effects {other:?}"),
    };

    let state = common::upload(
        state,
        "other.csv",
        vec![common::row(&["Region", "Total"]), common::row(&["North", "10"])],
    );
    assert_eq!(state.uploaded_file().map(|f| f.name.as_str()), Some("other.csv"));
    assert!(state.view().is_submitting);

    let (state, effects) = reply(state, submission_id, Ok(answer("hi")));

    assert!(effects.is_empty());
    assert_eq!(sent.name, "data.csv");
    assert_eq!(sent.bytes, old_bytes);
    assert_eq!(
        state.conversation().messages(),
        [Message::user("hello"), Message::assistant("hi", Vec::new())]
    );
    assert_eq!(state.annotations().headers(), ["Region", "Total"]);
}

#[test]
fn engine_stop_fails_in_flight_submission() {
    init_logging();
    let (state, effects) = submit(with_table(&["Age"]), Some("hello"));
    sent_submission_id(&effects);

    let (state, effects) = update(state, Msg::EngineStopped);

    error_ticket(&effects);
    assert!(state.conversation().is_empty());
    assert_eq!(state.submission().state(), &SubmissionState::Idle);
    assert_eq!(state.view().error.as_deref(), Some(GENERIC_FAILURE_MESSAGE));

    let (_, effects) = submit(state, Some("again"));
    sent_submission_id(&effects);
}

#[test]
fn engine_stop_fails_pending_ingestion() {
    init_logging();
    let (state, effects) = update(
        with_table(&["Age"]),
        Msg::FileSelected {
            path: std::path::PathBuf::from("next.csv"),
        },
    );
    assert!(matches!(effects.as_slice(), [Effect::ReadFile { .. }]));

    let (state, effects) = update(state, Msg::EngineStopped);

    error_ticket(&effects);
    assert!(!state.view().is_ingesting);
    assert_eq!(state.uploaded_file().map(|f| f.name.as_str()), Some("data.csv"));
}
