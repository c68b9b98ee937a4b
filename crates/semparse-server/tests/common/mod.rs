//! Common test utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use semparse_core::{ClusteringEngine, Exporter, SemparseError};
use semparse_server::{config::Config, routes, state::AppState};
use semparse_types::DisplayClusterResult;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Engine that answers every request with a canned response.
pub struct StubEngine {
    response: Result<Value, String>,
    pub calls: AtomicUsize,
}

impl StubEngine {
    pub fn returning(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(response),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusteringEngine for StubEngine {
    async fn run_clustering(
        &self,
        _lines: &[String],
        _min_cluster_size: u32,
        _min_samples: u32,
    ) -> semparse_core::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .clone()
            .map_err(SemparseError::ClusteringEngine)
    }
}

/// Exporter that keeps every result it is handed.
#[derive(Default)]
pub struct RecordingExporter {
    pub exported: Mutex<Vec<DisplayClusterResult>>,
}

impl RecordingExporter {
    pub fn exported(&self) -> Vec<DisplayClusterResult> {
        self.exported.lock().unwrap().clone()
    }
}

#[async_trait]
impl Exporter for RecordingExporter {
    async fn export_result(&self, data: &DisplayClusterResult) -> semparse_core::Result<()> {
        self.exported.lock().unwrap().push(data.clone());
        Ok(())
    }
}

/// Config pointing exports at `export_dir`, without word clouds.
pub fn test_config(export_dir: &Path) -> Config {
    Config {
        export_dir: export_dir.to_path_buf(),
        word_clouds: false,
        ..Config::default()
    }
}

/// App wired to the given collaborators.
pub fn test_app(
    config: Config,
    engine: Arc<dyn ClusteringEngine>,
    exporter: Arc<dyn Exporter>,
) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::with_collaborators(config, engine, exporter).unwrap());
    (routes::router(state.clone()), state)
}

/// Send a request and decode the JSON response body.
pub async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Five lines, the recommended minimum.
pub fn sample_lines() -> Vec<String> {
    ["apples", "pears", "cars", "trucks", "bikes"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Engine response splitting [`sample_lines`] into fruit and vehicles.
pub fn sample_response() -> Value {
    json!({
        "0": ["apples", "pears"],
        "1": ["cars", "trucks", "bikes"]
    })
}
