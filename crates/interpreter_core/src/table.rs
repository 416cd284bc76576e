use std::path::Path;

use bytes::Bytes;

pub type IngestId = u64;

/// Number of data rows (header excluded) the preview exposes.
pub const PREVIEW_ROW_LIMIT: usize = 50;

/// The one file currently accepted for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A read file together with its split rows, as delivered by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedUpload {
    pub file: UploadedFile,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error("file is empty")]
    Empty,
    #[error("header row has no cells")]
    NoHeaders,
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("could not read file: {0}")]
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    rows: Vec<Vec<String>>,
    headers: Vec<String>,
}

impl ParsedTable {
    /// Builds a table from split rows; row 0 is the header row.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self, ParseFailure> {
        let first = rows.first().ok_or(ParseFailure::Empty)?;
        if first.is_empty() {
            return Err(ParseFailure::NoHeaders);
        }
        let headers: Vec<String> = first.iter().map(|cell| cell.trim().to_string()).collect();
        Ok(Self { rows, headers })
    }

    /// Trimmed header labels, one per cell of row 0.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All rows including the untrimmed header row.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        &self.rows[1..]
    }

    pub fn preview_rows(&self) -> &[Vec<String>] {
        let data = self.data_rows();
        &data[..data.len().min(PREVIEW_ROW_LIMIT)]
    }
}

/// Outcome of handing a finished read to the ingestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A newer ingestion (or a removal) superseded this one.
    Stale,
    Accepted { headers: Vec<String> },
    Rejected(ParseFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveTable {
    file: UploadedFile,
    table: ParsedTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableIngestor {
    active: Option<ActiveTable>,
    pending: Option<IngestId>,
    last_id: IngestId,
}

impl TableIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new ingestion, superseding any one still pending.
    pub fn begin(&mut self) -> IngestId {
        self.last_id += 1;
        self.pending = Some(self.last_id);
        self.last_id
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_id(&self) -> Option<IngestId> {
        self.pending
    }

    /// Installs the result of ingestion `id` if it is still the latest one.
    ///
    /// A rejected result leaves the previously active file in place.
    pub fn complete(
        &mut self,
        id: IngestId,
        result: Result<LoadedUpload, ParseFailure>,
    ) -> IngestOutcome {
        if self.pending != Some(id) {
            return IngestOutcome::Stale;
        }
        self.pending = None;

        let loaded = match result {
            Ok(loaded) => loaded,
            Err(failure) => return IngestOutcome::Rejected(failure),
        };
        if loaded.file.bytes.is_empty() {
            return IngestOutcome::Rejected(ParseFailure::Empty);
        }
        match ParsedTable::from_rows(loaded.rows) {
            Ok(table) => {
                let headers = table.headers().to_vec();
                self.active = Some(ActiveTable {
                    file: loaded.file,
                    table,
                });
                IngestOutcome::Accepted { headers }
            }
            Err(failure) => IngestOutcome::Rejected(failure),
        }
    }

    /// Clears the active file and drops any pending ingestion.
    /// Returns whether anything was cleared.
    pub fn remove(&mut self) -> bool {
        let had_state = self.active.is_some() || self.pending.is_some();
        self.active = None;
        self.pending = None;
        had_state
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.active.as_ref().map(|active| &active.file)
    }

    pub fn table(&self) -> Option<&ParsedTable> {
        self.active.as_ref().map(|active| &active.table)
    }
}

/// Only comma-separated text files are accepted.
pub fn check_file_type(path: &Path) -> Result<(), ParseFailure> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Ok(())
    } else {
        Err(ParseFailure::UnsupportedType(path.display().to_string()))
    }
}
