//! Interpreter core: pure session state machine and view-model helpers.
mod annotations;
mod conversation;
mod effect;
mod error_presenter;
mod msg;
mod state;
mod submission;
mod table;
mod update;
mod view_model;

pub use annotations::AnnotationStore;
pub use conversation::{ConversationLog, Message, TentativeAppend};
pub use effect::Effect;
pub use error_presenter::{ErrorPresenter, ErrorTicket, ERROR_VISIBLE_FOR};
pub use msg::Msg;
pub use state::AppState;
pub use submission::{
    AssistantReply, FailureReason, SubmissionController, SubmissionId, SubmissionMode,
    SubmissionOutcome, SubmissionPayload, SubmissionState, SubmitFailure, UnknownMode,
    GENERIC_FAILURE_MESSAGE, NO_FILE_MESSAGE, PAYLOAD_TOO_LARGE_MESSAGE,
};
pub use table::{
    check_file_type, IngestId, IngestOutcome, LoadedUpload, ParseFailure, ParsedTable,
    TableIngestor, UploadedFile, PREVIEW_ROW_LIMIT,
};
pub use update::{update, PARSE_FAILURE_MESSAGE};
pub use view_model::{AppViewModel, ColumnRowView, FileView};
