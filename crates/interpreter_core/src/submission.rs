use std::fmt;
use std::str::FromStr;

use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::conversation::TentativeAppend;
use crate::{AppState, Effect, UploadedFile};

pub type SubmissionId = u64;

pub const NO_FILE_MESSAGE: &str = "No CSV file uploaded.";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str =
    "File too large. Please upload a file smaller than 25MB.";
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while processing your file.";

/// Model the remote service should answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionMode {
    #[default]
    Gpt4,
    Gpt35,
}

impl SubmissionMode {
    pub const ALL: [SubmissionMode; 2] = [SubmissionMode::Gpt4, SubmissionMode::Gpt35];

    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionMode::Gpt4 => "GPT-4",
            SubmissionMode::Gpt35 => "GPT-3.5",
        }
    }
}

impl fmt::Display for SubmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode {0:?}, expected one of GPT-4, GPT-3.5")]
pub struct UnknownMode(pub String);

impl FromStr for SubmissionMode {
    type Err = UnknownMode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        SubmissionMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| UnknownMode(raw.to_string()))
    }
}

/// Everything one outbound request carries, serialized at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub file: UploadedFile,
    pub column_data: String,
    pub messages: String,
    pub model: SubmissionMode,
    pub allow_logging: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub answer: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitFailure {
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("request failed: {0}")]
    TransportOrServer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    NoFile,
    PayloadTooLarge,
    TransportOrServer,
}

impl FailureReason {
    pub fn user_message(self) -> &'static str {
        match self {
            FailureReason::NoFile => NO_FILE_MESSAGE,
            FailureReason::PayloadTooLarge => PAYLOAD_TOO_LARGE_MESSAGE,
            FailureReason::TransportOrServer => GENERIC_FAILURE_MESSAGE,
        }
    }
}

impl From<&SubmitFailure> for FailureReason {
    fn from(failure: &SubmitFailure) -> Self {
        match failure {
            SubmitFailure::PayloadTooLarge => FailureReason::PayloadTooLarge,
            SubmitFailure::TransportOrServer(_) => FailureReason::TransportOrServer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Succeeded,
    Failed(FailureReason),
}

#[derive(Debug, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Sending {
        id: SubmissionId,
        tentative: Option<TentativeAppend>,
    },
}

/// In-flight guard plus bookkeeping for the last finished submission.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct SubmissionController {
    state: SubmissionState,
    last_id: SubmissionId,
    last_outcome: Option<SubmissionOutcome>,
}

impl SubmissionController {
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.state, SubmissionState::Sending { .. })
    }

    pub fn in_flight(&self) -> Option<SubmissionId> {
        match self.state {
            SubmissionState::Sending { id, .. } => Some(id),
            SubmissionState::Idle => None,
        }
    }

    pub fn last_outcome(&self) -> Option<SubmissionOutcome> {
        self.last_outcome
    }

    fn start(&mut self, tentative: Option<TentativeAppend>) -> SubmissionId {
        self.last_id += 1;
        self.state = SubmissionState::Sending {
            id: self.last_id,
            tentative,
        };
        self.last_id
    }

    /// Returns to `Idle` if `id` is the submission in flight, handing back its
    /// tentative append. `None` means the completion does not belong to us.
    fn finish(&mut self, id: SubmissionId) -> Option<Option<TentativeAppend>> {
        match &self.state {
            SubmissionState::Sending { id: current, .. } if *current == id => {}
            _ => return None,
        }
        match std::mem::take(&mut self.state) {
            SubmissionState::Sending { tentative, .. } => Some(tentative),
            SubmissionState::Idle => None,
        }
    }
}

impl AppState {
    pub(crate) fn begin_submission(&mut self, message: Option<String>) -> Vec<Effect> {
        if self.submission.is_sending() {
            engine_debug!("Submit ignored: a submission is already in flight");
            return Vec::new();
        }

        let Some(file) = self.ingestor.file().cloned() else {
            engine_info!("Submit rejected: no file uploaded");
            self.submission.last_outcome = Some(SubmissionOutcome::Failed(FailureReason::NoFile));
            self.mark_dirty();
            return vec![self.show_error(NO_FILE_MESSAGE)];
        };

        let message = message.filter(|text| !text.trim().is_empty());
        let tentative = message.map(|text| self.conversation.append_tentative(text));

        let (column_data, messages) = match self.serialize_context() {
            Ok(parts) => parts,
            Err(err) => {
                engine_warn!("Failed to serialize submission: {}", err);
                if let Some(tentative) = tentative {
                    tentative.revert(&mut self.conversation);
                }
                self.submission.last_outcome =
                    Some(SubmissionOutcome::Failed(FailureReason::TransportOrServer));
                self.mark_dirty();
                return vec![self.show_error(GENERIC_FAILURE_MESSAGE)];
            }
        };

        let payload = SubmissionPayload {
            file,
            column_data,
            messages,
            model: self.mode,
            allow_logging: self.allow_logging,
        };
        let submission_id = self.submission.start(tentative);
        engine_info!(
            "Submission {} started: file_bytes={} history_len={} model={}",
            submission_id,
            payload.file.size(),
            self.conversation.len(),
            payload.model
        );
        self.mark_dirty();
        vec![Effect::SendSubmission {
            submission_id,
            payload,
        }]
    }

    fn serialize_context(&self) -> serde_json::Result<(String, String)> {
        Ok((self.annotations.to_json()?, self.conversation.to_json()?))
    }

    pub(crate) fn finish_submission(
        &mut self,
        submission_id: SubmissionId,
        result: Result<AssistantReply, SubmitFailure>,
    ) -> Vec<Effect> {
        let Some(tentative) = self.submission.finish(submission_id) else {
            engine_debug!("Ignoring completion of unknown submission {}", submission_id);
            return Vec::new();
        };
        self.mark_dirty();

        match result {
            Ok(reply) => {
                if let Some(tentative) = tentative {
                    tentative.commit();
                }
                engine_info!(
                    "Submission {} succeeded: answer_len={} images={}",
                    submission_id,
                    reply.answer.len(),
                    reply.images.len()
                );
                self.conversation.append_assistant(reply.answer, reply.images);
                self.submission.last_outcome = Some(SubmissionOutcome::Succeeded);
                Vec::new()
            }
            Err(failure) => {
                engine_warn!("Submission {} failed: {}", submission_id, failure);
                if let Some(tentative) = tentative {
                    tentative.revert(&mut self.conversation);
                }
                let reason = FailureReason::from(&failure);
                self.submission.last_outcome = Some(SubmissionOutcome::Failed(reason));
                vec![self.show_error(reason.user_message())]
            }
        }
    }
}
