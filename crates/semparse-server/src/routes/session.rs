//! Session workflow routes.

use super::ApiError;
use crate::state::{exporter_for, AppState};
use axum::{extract::State, Json};
use semparse_core::{CsvFileSource, FixedPath, PastedText};
use semparse_types::{ClusterParamsInput, SessionSnapshot};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

type SnapshotResult = Result<Json<SessionSnapshot>, ApiError>;

pub async fn get(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot().await)
}

#[derive(Deserialize)]
pub struct PasteRequest {
    /// Clipboard text, absent when the clipboard held no text.
    #[serde(default)]
    pub text: Option<String>,
}

pub async fn paste(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PasteRequest>,
) -> SnapshotResult {
    let source = match req.text {
        Some(text) => PastedText::new(text),
        None => PastedText::absent(),
    };
    let snapshot = state.session.acquire_from_clipboard(Arc::new(source)).await?;
    info!(target: "semparse::api", "Pasted {} lines", snapshot.line_count);
    Ok(Json(snapshot))
}

#[derive(Deserialize)]
pub struct LinesRequest {
    pub lines: Vec<String>,
}

pub async fn lines(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LinesRequest>,
) -> SnapshotResult {
    Ok(Json(state.session.acquire(req.lines).await?))
}

#[derive(Deserialize)]
pub struct CsvRequest {
    /// File chosen in the front end's picker; absent or empty when cancelled.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

pub async fn csv(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CsvRequest>,
) -> SnapshotResult {
    let picker = match req.path.filter(|p| !p.as_os_str().is_empty()) {
        Some(path) => FixedPath::new(path),
        None => FixedPath::none(),
    };
    let snapshot = state
        .session
        .acquire_from_csv(Arc::new(CsvFileSource::new(picker)))
        .await?;
    info!(target: "semparse::api", "Loaded {} lines from CSV", snapshot.line_count);
    Ok(Json(snapshot))
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ClusterParamsInput>,
) -> SnapshotResult {
    Ok(Json(state.session.submit(input).await?))
}

#[derive(Deserialize)]
pub struct ExportRequest {
    /// Target directory; the configured export directory when absent.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

pub async fn export(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExportRequest>,
) -> SnapshotResult {
    match req.dir {
        Some(dir) => {
            info!(target: "semparse::api", "Exporting to {}", dir.display());
            let exporter = exporter_for(&state.config, &dir);
            state.session.export_with(exporter).await?
        }
        None => state.session.export().await?,
    }
    Ok(Json(state.session.snapshot().await))
}

pub async fn reset(State(state): State<Arc<AppState>>) -> SnapshotResult {
    Ok(Json(state.session.reset().await?))
}

pub async fn abandon(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.session.abandon().await)
}
