//! HTTP client for a clustering engine service.

use crate::{ClusteringEngine, Result, SemparseError};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Request body sent to the engine's `/cluster` endpoint.
#[derive(Debug, Serialize)]
pub struct ClusterRequestBody<'a> {
    pub lines: &'a [String],
    pub min_cluster_size: u32,
    pub min_samples: u32,
}

/// Clustering engine reached over HTTP.
pub struct HttpClusteringEngine {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpClusteringEngine {
    /// Create a client for the engine at `base_url`.
    ///
    /// With `timeout` unset, requests wait as long as the engine takes.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SemparseError::ClusteringEngine(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: cluster_endpoint(base_url),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn cluster_endpoint(base_url: &str) -> String {
    format!("{}/cluster", base_url.trim_end_matches('/'))
}

#[async_trait]
impl ClusteringEngine for HttpClusteringEngine {
    async fn run_clustering(
        &self,
        lines: &[String],
        min_cluster_size: u32,
        min_samples: u32,
    ) -> Result<Value> {
        let body = ClusterRequestBody {
            lines,
            min_cluster_size,
            min_samples,
        };

        debug!(target: "semparse::cluster", "POST {} ({} lines)", self.endpoint, lines.len());

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| SemparseError::ClusteringEngine(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SemparseError::ClusteringEngine(format!(
                "engine returned {}: {}",
                status,
                detail.trim()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SemparseError::ClusteringEngine(format!("undecodable response: {}", e)))
    }
}
