use crate::annotations::AnnotationStore;
use crate::conversation::ConversationLog;
use crate::error_presenter::{ErrorPresenter, ERROR_VISIBLE_FOR};
use crate::submission::{SubmissionController, SubmissionMode};
use crate::table::{ParsedTable, TableIngestor, UploadedFile};
use crate::view_model::{AppViewModel, ColumnRowView, FileView};
use crate::Effect;

/// Single owner of all session state; mutated only through `update`.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) ingestor: TableIngestor,
    pub(crate) annotations: AnnotationStore,
    pub(crate) conversation: ConversationLog,
    pub(crate) submission: SubmissionController,
    pub(crate) errors: ErrorPresenter,
    pub(crate) mode: SubmissionMode,
    pub(crate) allow_logging: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(mode: SubmissionMode, allow_logging: bool) -> Self {
        Self {
            mode,
            allow_logging,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let table = self.ingestor.table();
        AppViewModel {
            file: self.ingestor.file().map(|file| FileView {
                name: file.name.clone(),
                size: file.size(),
            }),
            is_ingesting: self.ingestor.is_pending(),
            columns: self
                .annotations
                .headers()
                .iter()
                .enumerate()
                .map(|(index, header)| ColumnRowView {
                    index,
                    header: header.clone(),
                    description: self.annotations.value(header).unwrap_or_default().to_string(),
                })
                .collect(),
            preview_header: table
                .map(|table| table.headers().to_vec())
                .unwrap_or_default(),
            preview_rows: table
                .map(|table| table.preview_rows().to_vec())
                .unwrap_or_default(),
            messages: self.conversation.messages().to_vec(),
            mode: self.mode,
            allow_logging: self.allow_logging,
            is_submitting: self.submission.is_sending(),
            last_outcome: self.submission.last_outcome(),
            error: self.errors.visible_message().map(ToOwned::to_owned),
        }
    }

    pub fn uploaded_file(&self) -> Option<&UploadedFile> {
        self.ingestor.file()
    }

    pub fn parsed_table(&self) -> Option<&ParsedTable> {
        self.ingestor.table()
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    pub fn errors(&self) -> &ErrorPresenter {
        &self.errors
    }

    pub fn submission(&self) -> &SubmissionController {
        &self.submission
    }

    pub fn mode(&self) -> SubmissionMode {
        self.mode
    }

    pub fn allow_logging(&self) -> bool {
        self.allow_logging
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Surfaces `message` and returns the effect that will hide it again.
    pub(crate) fn show_error(&mut self, message: &str) -> Effect {
        let ticket = self.errors.show(message);
        self.mark_dirty();
        Effect::ScheduleErrorClear {
            ticket,
            delay: ERROR_VISIBLE_FOR,
        }
    }
}
