//! Pipeline controller for Semparse: acquisition, clustering and export.

mod acquire;
mod cluster;
mod engine;
mod error;
mod export;
mod session;
mod wordcloud;

pub use acquire::{
    split_clipboard_text, ClipboardSource, CsvFileSource, CsvSource, FixedPath, PastedText,
    PathPicker, read_first_column,
};
pub use cluster::{parse_engine_response, ClusterRequestBuilder, ClusteringEngine};
pub use engine::{ClusterRequestBody, HttpClusteringEngine};
pub use error::SemparseError;
pub use export::{CsvGridExporter, ExportBundle, ExportCoordinator, Exporter, EXPORT_FILE_NAME};
pub use session::{SessionConfig, SessionController};
pub use wordcloud::{cloud_file_name, stop_words, WordCloudExporter};

/// Result type for Semparse operations.
pub type Result<T> = std::result::Result<T, SemparseError>;
