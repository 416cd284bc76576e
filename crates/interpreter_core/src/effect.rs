use std::path::PathBuf;
use std::time::Duration;

use crate::{ErrorTicket, IngestId, SubmissionId, SubmissionPayload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Read and split the file at `path`; answer with `Msg::FileLoaded`.
    ReadFile { ingest_id: IngestId, path: PathBuf },
    /// Post the payload to the analysis service; answer with `Msg::SubmissionFinished`.
    SendSubmission {
        submission_id: SubmissionId,
        payload: SubmissionPayload,
    },
    /// Replace any pending error clear; answer with `Msg::ErrorClearDue` after `delay`.
    ScheduleErrorClear { ticket: ErrorTicket, delay: Duration },
}
