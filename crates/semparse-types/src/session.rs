//! Session stages and the snapshot the front end renders.

use crate::{ClusterParams, DisplayClusterResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stage of the clustering workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStage {
    /// No lines loaded.
    Empty,
    /// Lines loaded, not yet clustered.
    Collected,
    /// Lines loaded and clustered.
    Clustered,
}

impl SessionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Collected => "collected",
            Self::Clustered => "clustered",
        }
    }
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boundary call that holds a session busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyOperation {
    Acquiring,
    Clustering,
    Exporting,
}

impl BusyOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acquiring => "acquiring",
            Self::Clustering => "clustering",
            Self::Exporting => "exporting",
        }
    }
}

impl fmt::Display for BusyOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable classification of a failure, shared with the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    ClipboardUnavailable,
    FileNotSelected,
    FileUnreadable,
    CsvParse,
    ClusteringEngine,
    Export,
    Busy,
    InvalidStage,
    HungOperation,
    Superseded,
    /// A boundary task panicked.
    Internal,
}

impl ErrorKind {
    /// Errors raised while reading input lines.
    pub fn is_acquisition(&self) -> bool {
        matches!(
            self,
            Self::ClipboardUnavailable | Self::FileNotSelected | Self::FileUnreadable | Self::CsvParse
        )
    }
}

/// Last reported failure, kept for display until the next success or reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureNotice {
    pub kind: ErrorKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// In-flight boundary call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInfo {
    pub operation: BusyOperation,
    pub since: DateTime<Utc>,
}

/// Read-only view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// Fixed for the life of the process.
    pub session_id: Uuid,
    pub stage: SessionStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busy: Option<BusyInfo>,
    pub line_count: usize,
    pub lines: Vec<String>,
    /// False when fewer lines are loaded than recommended for clustering.
    pub meets_recommended_size: bool,
    pub params: ClusterParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clusters: Option<DisplayClusterResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<FailureNotice>,
}

impl SessionSnapshot {
    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serialization() {
        assert_eq!(
            serde_json::to_string(&SessionStage::Clustered).unwrap(),
            r#""clustered""#
        );
        assert_eq!(SessionStage::Collected.to_string(), "collected");
    }

    #[test]
    fn test_error_kind_acquisition() {
        assert!(ErrorKind::FileNotSelected.is_acquisition());
        assert!(ErrorKind::CsvParse.is_acquisition());
        assert!(!ErrorKind::Validation.is_acquisition());
        assert!(!ErrorKind::ClusteringEngine.is_acquisition());
        assert_eq!(
            serde_json::to_string(&ErrorKind::HungOperation).unwrap(),
            r#""hung_operation""#
        );
    }

    #[test]
    fn test_snapshot_omits_absent_fields() {
        let snapshot = SessionSnapshot {
            session_id: Uuid::nil(),
            stage: SessionStage::Empty,
            busy: None,
            line_count: 0,
            lines: Vec::new(),
            meets_recommended_size: false,
            params: ClusterParams::default(),
            clusters: None,
            last_failure: None,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["stage"], "empty");
        assert!(json.get("clusters").is_none());
        assert!(json.get("busy").is_none());
        assert_eq!(json["params"]["min_cluster_size"], 5);
    }
}
