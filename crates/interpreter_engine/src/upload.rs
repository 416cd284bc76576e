use std::path::Path;

use bytes::Bytes;
use engine_logging::engine_debug;

use crate::decode::{decode_text, DecodeError};
use crate::LoadedTable;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },
    #[error("file is empty")]
    Empty,
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("malformed csv: {0}")]
    Csv(String),
    #[error("parse task failed: {0}")]
    Interrupted(String),
}

/// Reads the whole file at `path` and splits it into rows.
pub async fn read_upload(path: &Path) -> Result<LoadedTable, ReadError> {
    let raw = tokio::fs::read(path).await.map_err(|err| ReadError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let bytes = Bytes::from(raw);

    let to_split = bytes.clone();
    let rows = tokio::task::spawn_blocking(move || split_rows(&to_split))
        .await
        .map_err(|err| ReadError::Interrupted(err.to_string()))??;
    engine_debug!(
        "Read {} ({} bytes, {} rows)",
        file_name,
        bytes.len(),
        rows.len()
    );

    Ok(LoadedTable {
        file_name,
        bytes,
        rows,
    })
}

/// Splits comma-separated text into rows of cells. Blank lines are skipped and
/// rows may differ in width.
pub fn split_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, ReadError> {
    if bytes.is_empty() {
        return Err(ReadError::Empty);
    }
    let decoded = decode_text(bytes)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(decoded.text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| ReadError::Csv(err.to_string()))?;
        rows.push(record.iter().map(ToOwned::to_owned).collect());
    }
    if rows.is_empty() {
        return Err(ReadError::Empty);
    }
    Ok(rows)
}
