//! Clustering request building and response normalization.

use crate::{Result, SemparseError};
use async_trait::async_trait;
use semparse_types::{ClusterId, ClusterParams, RawClusterResult, WorkingSet};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// External engine that groups lines by meaning.
///
/// Returns a JSON object mapping stringified zero-based cluster ids to the
/// lines assigned to each cluster.
#[async_trait]
pub trait ClusteringEngine: Send + Sync {
    async fn run_clustering(
        &self,
        lines: &[String],
        min_cluster_size: u32,
        min_samples: u32,
    ) -> Result<Value>;
}

/// Adapter between a session and the clustering engine.
///
/// Makes exactly one engine call per request and accepts the response only
/// if it is well formed as a whole.
#[derive(Clone)]
pub struct ClusterRequestBuilder {
    engine: Arc<dyn ClusteringEngine>,
}

impl ClusterRequestBuilder {
    pub fn new(engine: Arc<dyn ClusteringEngine>) -> Self {
        Self { engine }
    }

    /// Run one clustering request for a non-empty working set.
    pub async fn request(
        &self,
        working_set: &WorkingSet,
        params: ClusterParams,
    ) -> Result<RawClusterResult> {
        debug_assert!(!working_set.is_empty(), "working set must be collected");

        debug!(
            target: "semparse::cluster",
            "Requesting clusters for {} lines (min_cluster_size={}, min_samples={})",
            working_set.len(),
            params.min_cluster_size(),
            params.min_samples()
        );

        let response = self
            .engine
            .run_clustering(
                working_set.lines(),
                params.min_cluster_size(),
                params.min_samples(),
            )
            .await
            .map_err(|e| match e {
                SemparseError::ClusteringEngine(_) => e,
                other => SemparseError::ClusteringEngine(other.to_string()),
            })?;

        let raw = parse_engine_response(response, working_set).inspect_err(|e| {
            warn!(target: "semparse::cluster", "Rejected engine response: {}", e);
        })?;

        info!(
            target: "semparse::cluster",
            "Engine returned {} clusters for {} lines",
            raw.len(),
            working_set.len()
        );
        Ok(raw)
    }
}

/// Validate an engine response against the working set that was sent.
///
/// The response must be an object whose keys are non-negative integers and
/// whose values are arrays of strings drawn from `working_set`.
pub fn parse_engine_response(response: Value, working_set: &WorkingSet) -> Result<RawClusterResult> {
    let Value::Object(map) = response else {
        return Err(malformed(format!(
            "expected an object of clusters, got {}",
            json_type(&response)
        )));
    };

    let known = working_set.line_index();
    let mut result = RawClusterResult::new();

    for (key, value) in map {
        let id: ClusterId = key.parse().map_err(|e| malformed(format!("{}", e)))?;

        let Value::Array(items) = value else {
            return Err(malformed(format!(
                "cluster {} should be an array of lines, got {}",
                key,
                json_type(&value)
            )));
        };

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let Value::String(line) = item else {
                return Err(malformed(format!(
                    "cluster {} contains a {} instead of a line",
                    key,
                    json_type(&item)
                )));
            };
            if !known.contains(line.as_str()) {
                return Err(malformed(format!(
                    "cluster {} contains a line that was not submitted: {:?}",
                    key, line
                )));
            }
            lines.push(line);
        }

        result
            .insert(id, lines)
            .map_err(|e| malformed(e.to_string()))?;
    }

    Ok(result)
}

fn malformed(detail: String) -> SemparseError {
    SemparseError::ClusteringEngine(format!("malformed response: {}", detail))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
