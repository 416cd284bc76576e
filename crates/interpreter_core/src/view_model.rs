use crate::{Message, SubmissionMode, SubmissionOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileView {
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRowView {
    pub index: usize,
    pub header: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub file: Option<FileView>,
    pub is_ingesting: bool,
    pub columns: Vec<ColumnRowView>,
    pub preview_header: Vec<String>,
    pub preview_rows: Vec<Vec<String>>,
    pub messages: Vec<Message>,
    pub mode: SubmissionMode,
    pub allow_logging: bool,
    pub is_submitting: bool,
    pub last_outcome: Option<SubmissionOutcome>,
    /// Present only while the error is visible.
    pub error: Option<String>,
}
