//! Export of clustered results.

use crate::{Result, SemparseError};
use async_trait::async_trait;
use semparse_types::DisplayClusterResult;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// File written by [`CsvGridExporter`] inside the target directory.
pub const EXPORT_FILE_NAME: &str = "cluster.csv";

/// Writes a clustered result to some output artifact.
#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export_result(&self, data: &DisplayClusterResult) -> Result<()>;
}

/// Hands a result to an exporter once per request.
///
/// No retries, and the result is only ever borrowed.
#[derive(Clone)]
pub struct ExportCoordinator {
    exporter: Arc<dyn Exporter>,
}

impl ExportCoordinator {
    pub fn new(exporter: Arc<dyn Exporter>) -> Self {
        Self { exporter }
    }

    pub async fn export(&self, result: &DisplayClusterResult) -> Result<()> {
        info!(
            target: "semparse::export",
            "Exporting {} clusters ({} lines)",
            result.len(),
            result.line_count()
        );

        match self.exporter.export_result(result).await {
            Ok(()) => {
                info!(target: "semparse::export", "Export complete");
                Ok(())
            }
            Err(e) => {
                error!(target: "semparse::export", "Export failed: {}", e);
                Err(match e {
                    SemparseError::Export(_) => e,
                    other => SemparseError::Export(other.to_string()),
                })
            }
        }
    }
}

/// Runs several exporters in order, stopping at the first failure.
#[derive(Clone, Default)]
pub struct ExportBundle {
    exporters: Vec<Arc<dyn Exporter>>,
}

impl ExportBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, exporter: Arc<dyn Exporter>) -> Self {
        self.exporters.push(exporter);
        self
    }

    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }
}

#[async_trait]
impl Exporter for ExportBundle {
    async fn export_result(&self, data: &DisplayClusterResult) -> Result<()> {
        for exporter in &self.exporters {
            exporter.export_result(data).await?;
        }
        Ok(())
    }
}

/// Writes `cluster.csv`: one column per cluster, headed by its label.
#[derive(Debug, Clone)]
pub struct CsvGridExporter {
    dir: PathBuf,
}

impl CsvGridExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.join(EXPORT_FILE_NAME)
    }
}

#[async_trait]
impl Exporter for CsvGridExporter {
    async fn export_result(&self, data: &DisplayClusterResult) -> Result<()> {
        let dir = self.dir.clone();
        let data = data.clone();
        tokio::task::spawn_blocking(move || write_grid(&dir, &data))
            .await
            .map_err(|e| SemparseError::Export(format!("export task failed: {}", e)))?
            .map(|_| ())
    }
}

/// Write the column grid, padding short clusters with empty cells.
fn write_grid(dir: &Path, data: &DisplayClusterResult) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .map_err(|e| SemparseError::Export(format!("cannot create {}: {}", dir.display(), e)))?;

    let path = dir.join(EXPORT_FILE_NAME);
    let file = File::create(&path)
        .map_err(|e| SemparseError::Export(format!("cannot create {}: {}", path.display(), e)))?;
    let mut writer = csv::Writer::from_writer(file);
    let write_err = |e: csv::Error| SemparseError::Export(format!("cannot write {}: {}", path.display(), e));

    if !data.is_empty() {
        writer.write_record(data.labels()).map_err(write_err)?;

        for row in 0..data.max_cluster_len() {
            let cells = data
                .clusters()
                .iter()
                .map(|c| c.lines.get(row).map(String::as_str).unwrap_or(""));
            writer.write_record(cells).map_err(write_err)?;
        }
    }

    writer
        .flush()
        .map_err(|e| SemparseError::Export(format!("cannot write {}: {}", path.display(), e)))?;

    info!(target: "semparse::export", "Wrote {}", path.display());
    Ok(path)
}
