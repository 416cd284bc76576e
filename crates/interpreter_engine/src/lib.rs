//! Interpreter engine: IO pipeline and effect execution.
mod decode;
mod engine;
mod submit;
mod timer;
mod types;
mod upload;

pub use decode::{decode_text, DecodeError, DecodedText};
pub use engine::EngineHandle;
pub use submit::{ReqwestSubmitter, SubmitSettings, Submitter, DEFAULT_ENDPOINT};
pub use timer::ReplaceableTimer;
pub use types::{
    AnalysisReply, EngineEvent, EngineStopped, ErrorTicket, FailureKind, IngestId, LoadedTable,
    SubmissionId, SubmissionRequest, SubmitError,
};
pub use upload::{read_upload, split_rows, ReadError};
