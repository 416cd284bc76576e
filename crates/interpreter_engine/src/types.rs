use std::fmt;

use bytes::Bytes;
use serde::Deserialize;

use crate::upload::ReadError;

pub type IngestId = u64;
pub type SubmissionId = u64;
pub type ErrorTicket = u64;

/// A read upload: the raw bytes plus their comma-split rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTable {
    pub file_name: String,
    pub bytes: Bytes,
    pub rows: Vec<Vec<String>>,
}

/// Multipart form contents for one analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub file_name: String,
    pub file_bytes: Bytes,
    /// JSON object mapping header to description.
    pub column_data: String,
    /// JSON array of chat messages.
    pub messages: String,
    pub model: String,
    pub allow_logging: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisReply {
    pub answer: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    FileLoaded {
        ingest_id: IngestId,
        result: Result<LoadedTable, ReadError>,
    },
    SubmissionCompleted {
        submission_id: SubmissionId,
        result: Result<AnalysisReply, SubmitError>,
    },
    ErrorClearDue {
        ticket: ErrorTicket,
    },
}

/// The engine thread no longer accepts commands or delivers events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("engine has stopped")]
pub struct EngineStopped;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SubmitError {
    pub kind: FailureKind,
    pub message: String,
}

impl SubmitError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidEndpoint,
    HttpStatus(u16),
    Timeout,
    Network,
    MalformedReply,
}

impl FailureKind {
    pub fn is_payload_too_large(&self) -> bool {
        matches!(self, FailureKind::HttpStatus(413))
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::MalformedReply => write!(f, "malformed reply"),
        }
    }
}
