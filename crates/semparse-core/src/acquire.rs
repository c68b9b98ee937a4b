//! Input acquisition from clipboard text and CSV files.

use crate::{Result, SemparseError};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tokio::task::JoinError;
use tracing::debug;

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").expect("valid line break regex"));

/// Split clipboard text into lines on `\n` or `\r\n`.
///
/// Pieces are returned verbatim: nothing is trimmed, de-duplicated or
/// dropped, so a trailing line break yields a trailing empty line.
pub fn split_clipboard_text(text: &str) -> Vec<String> {
    LINE_BREAK.split(text).map(str::to_string).collect()
}

/// Source of the current clipboard text.
#[async_trait]
pub trait ClipboardSource: Send + Sync {
    /// Fails with [`SemparseError::ClipboardUnavailable`] when there is no text.
    async fn read_clipboard_text(&self) -> Result<String>;
}

/// Clipboard snapshot handed over by the front end.
#[derive(Debug, Clone)]
pub struct PastedText {
    text: Option<String>,
}

impl PastedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// A clipboard holding no text (e.g. an image).
    pub fn absent() -> Self {
        Self { text: None }
    }
}

#[async_trait]
impl ClipboardSource for PastedText {
    async fn read_clipboard_text(&self) -> Result<String> {
        match &self.text {
            Some(text) if !text.is_empty() => Ok(text.clone()),
            _ => Err(SemparseError::ClipboardUnavailable),
        }
    }
}

/// Source of values ingested from a CSV file.
#[async_trait]
pub trait CsvSource: Send + Sync {
    /// One value per data row, header excluded.
    async fn ingest_csv(&self) -> Result<Vec<String>>;
}

/// Chooses the CSV file to ingest. `None` means the user cancelled.
#[async_trait]
pub trait PathPicker: Send + Sync {
    async fn pick_csv(&self) -> Option<PathBuf>;
}

/// Picker that always answers with a preselected path.
#[derive(Debug, Clone, Default)]
pub struct FixedPath(Option<PathBuf>);

impl FixedPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(Some(path.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

#[async_trait]
impl PathPicker for FixedPath {
    async fn pick_csv(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Reads the first column of a picked CSV file.
pub struct CsvFileSource<P> {
    picker: P,
}

impl<P: PathPicker> CsvFileSource<P> {
    pub fn new(picker: P) -> Self {
        Self { picker }
    }
}

#[async_trait]
impl<P: PathPicker> CsvSource for CsvFileSource<P> {
    async fn ingest_csv(&self) -> Result<Vec<String>> {
        let path = self
            .picker
            .pick_csv()
            .await
            .ok_or(SemparseError::FileNotSelected)?;

        debug!(target: "semparse::acquire", "Reading CSV from {}", path.display());

        let target = path.clone();
        tokio::task::spawn_blocking(move || read_first_column(&target))
            .await
            .map_err(|e| reader_task_failed(&path, e))?
    }
}

/// The blocking reader never finished, so the file was never judged.
fn reader_task_failed(path: &Path, err: JoinError) -> SemparseError {
    SemparseError::FileUnreadable {
        path: path.to_path_buf(),
        source: std::io::Error::other(format!("CSV reader task failed: {}", err)),
    }
}

/// Read non-blank values from the first column of a CSV file with a header row.
///
/// Values are kept verbatim; only their trimmed form decides blankness.
/// Any malformed record rejects the whole file.
pub fn read_first_column(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|source| SemparseError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(value) = record.get(0) {
            if !value.trim().is_empty() {
                values.push(value.to_string());
            }
        }
    }

    debug!(target: "semparse::acquire", "Read {} values from {}", values.len(), path.display());
    Ok(values)
}
