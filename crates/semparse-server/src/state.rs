//! Shared application state.

use crate::config::Config;
use semparse_core::{
    ClusteringEngine, CsvGridExporter, ExportBundle, Exporter, HttpClusteringEngine,
    SessionController, WordCloudExporter,
};
use std::path::Path;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub session: Arc<SessionController>,
    pub config: Config,
}

impl AppState {
    /// Build state talking to the configured HTTP engine and exporting to `export_dir`.
    pub fn new(config: Config) -> semparse_core::Result<Self> {
        let engine = Arc::new(HttpClusteringEngine::new(
            &config.engine_url,
            config.engine_timeout(),
        )?);
        let exporter = exporter_for(&config, &config.export_dir);
        Self::with_collaborators(config, engine, exporter)
    }

    pub fn with_collaborators(
        config: Config,
        engine: Arc<dyn ClusteringEngine>,
        exporter: Arc<dyn Exporter>,
    ) -> semparse_core::Result<Self> {
        let session = Arc::new(SessionController::new(
            config.session_config()?,
            engine,
            exporter,
        ));

        Ok(Self { session, config })
    }
}

/// Exporters writing into `dir`: the CSV grid, then word clouds when enabled.
pub fn exporter_for(config: &Config, dir: &Path) -> Arc<dyn Exporter> {
    let mut bundle = ExportBundle::new().with(Arc::new(CsvGridExporter::new(dir)));
    if config.word_clouds {
        bundle = bundle.with(Arc::new(WordCloudExporter::new(dir)));
    }
    Arc::new(bundle)
}
