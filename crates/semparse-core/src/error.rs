//! Error types for Semparse.

use semparse_types::{BusyOperation, ErrorKind, SessionStage, ValidationError};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SemparseError {
    #[error("Invalid parameters: {0}")]
    Validation(#[from] ValidationError),

    #[error("Clipboard has no text content")]
    ClipboardUnavailable,

    #[error("No file was selected")]
    FileNotSelected,

    #[error("Cannot read {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Clustering engine error: {0}")]
    ClusteringEngine(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Session is busy: {0} in progress")]
    Busy(BusyOperation),

    #[error("Invalid session state: expected {expected}, got {actual}")]
    InvalidStage {
        expected: SessionStage,
        actual: SessionStage,
    },

    #[error("{operation} did not finish within {}s", waited.as_secs_f64())]
    HungOperation {
        operation: BusyOperation,
        waited: Duration,
    },

    #[error("Session was reset before {0} finished")]
    Superseded(BusyOperation),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SemparseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::ClipboardUnavailable => ErrorKind::ClipboardUnavailable,
            Self::FileNotSelected => ErrorKind::FileNotSelected,
            Self::FileUnreadable { .. } => ErrorKind::FileUnreadable,
            Self::CsvParse(_) => ErrorKind::CsvParse,
            Self::ClusteringEngine(_) => ErrorKind::ClusteringEngine,
            Self::Export(_) => ErrorKind::Export,
            Self::Busy(_) => ErrorKind::Busy,
            Self::InvalidStage { .. } => ErrorKind::InvalidStage,
            Self::HungOperation { .. } => ErrorKind::HungOperation,
            Self::Superseded(_) => ErrorKind::Superseded,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<csv::Error> for SemparseError {
    fn from(err: csv::Error) -> Self {
        Self::CsvParse(err.to_string())
    }
}
