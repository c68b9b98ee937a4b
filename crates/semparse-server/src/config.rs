//! Server configuration.

use anyhow::Result;
use semparse_core::SessionConfig;
use semparse_types::{ClusterParams, DEFAULT_MIN_CLUSTER_SIZE, DEFAULT_MIN_SAMPLES, RECOMMENDED_MIN_LINES};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Base URL of the clustering engine service.
    #[serde(default = "default_engine_url")]
    pub engine_url: String,
    /// Seconds before a boundary call is reported as hung. 0 waits forever.
    #[serde(default = "default_engine_timeout_secs")]
    pub engine_timeout_secs: u64,
    /// Directory `cluster.csv` is written to when no directory is requested.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    /// Also render a word-cloud PNG per cluster next to `cluster.csv`.
    #[serde(default = "default_word_clouds")]
    pub word_clouds: bool,
    #[serde(default = "default_min_cluster_size")]
    pub default_min_cluster_size: u32,
    #[serde(default = "default_min_samples")]
    pub default_min_samples: u32,
    #[serde(default = "default_recommended_min_lines")]
    pub recommended_min_lines: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8765
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./frontend/dist")
}

fn default_engine_url() -> String {
    "http://127.0.0.1:8766".to_string()
}

fn default_engine_timeout_secs() -> u64 {
    300
}

fn default_export_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("semparse")
}

fn default_word_clouds() -> bool {
    true
}

fn default_min_cluster_size() -> u32 {
    DEFAULT_MIN_CLUSTER_SIZE
}

fn default_min_samples() -> u32 {
    DEFAULT_MIN_SAMPLES
}

fn default_recommended_min_lines() -> usize {
    RECOMMENDED_MIN_LINES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            engine_url: default_engine_url(),
            engine_timeout_secs: default_engine_timeout_secs(),
            export_dir: default_export_dir(),
            word_clouds: default_word_clouds(),
            default_min_cluster_size: default_min_cluster_size(),
            default_min_samples: default_min_samples(),
            recommended_min_lines: default_recommended_min_lines(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default location (config/default.toml) or fall back to defaults.
    pub fn load() -> Result<Self> {
        let config_path = PathBuf::from("config/default.toml");
        if config_path.exists() {
            return Self::load_from(&config_path);
        }

        Ok(Config::default())
    }

    pub fn engine_timeout(&self) -> Option<Duration> {
        (self.engine_timeout_secs > 0).then(|| Duration::from_secs(self.engine_timeout_secs))
    }

    /// Controller settings. Fails if the default parameters are out of range.
    pub fn session_config(&self) -> semparse_core::Result<SessionConfig> {
        let default_params = ClusterParams::new(
            i64::from(self.default_min_cluster_size),
            i64::from(self.default_min_samples),
        )?;

        Ok(SessionConfig {
            default_params,
            boundary_timeout: self.engine_timeout(),
            recommended_min_lines: self.recommended_min_lines,
        })
    }
}
