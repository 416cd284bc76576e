use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a file to upload.
    FileSelected { path: PathBuf },
    /// Engine finished reading a file.
    FileLoaded {
        ingest_id: crate::IngestId,
        result: Result<crate::LoadedUpload, crate::ParseFailure>,
    },
    /// User removed the uploaded file.
    FileRemoved,
    /// User typed a column description.
    AnnotationEdited { header: String, text: String },
    /// User dropped a column from the annotation list.
    HeaderRemoved { index: usize, header: String },
    /// User picked a model.
    ModeSelected(crate::SubmissionMode),
    /// User flipped the server logging consent checkbox.
    AllowLoggingToggled,
    /// User submitted, optionally with a new chat message.
    SubmitClicked { message: Option<String> },
    /// Engine completion for a submission.
    SubmissionFinished {
        submission_id: crate::SubmissionId,
        result: Result<crate::AssistantReply, crate::SubmitFailure>,
    },
    /// A scheduled error clear fired.
    ErrorClearDue { ticket: crate::ErrorTicket },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// The IO engine is gone; work it was running will never complete.
    EngineStopped,
}
