//! Cluster identifiers and clustering results.
//!
//! Engines identify clusters with zero-based integers serialized as strings.
//! Ids are parsed into [`ClusterId`] at the boundary and only turned back into
//! text as a 1-based display label, so ordering is always numeric.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Engine-assigned cluster identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(u32);

impl ClusterId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// 1-based number shown to users.
    pub fn display_number(&self) -> u64 {
        u64::from(self.0) + 1
    }

    /// Human-readable label, e.g. `Cluster 1` for id 0.
    pub fn label(&self) -> String {
        format!("Cluster {}", self.display_number())
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors building a cluster result from engine data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterIdError {
    #[error("Cluster id is not a non-negative integer: {0:?}")]
    Invalid(String),

    #[error("Cluster id {0} appears more than once")]
    Duplicate(ClusterId),
}

impl FromStr for ClusterId {
    type Err = ClusterIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // u32::from_str accepts a leading '+', engines never send one
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ClusterIdError::Invalid(s.to_string()));
        }
        s.parse::<u32>()
            .map(ClusterId)
            .map_err(|_| ClusterIdError::Invalid(s.to_string()))
    }
}

/// Engine output keyed by numeric cluster id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawClusterResult {
    clusters: BTreeMap<ClusterId, Vec<String>>,
}

impl RawClusterResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(id, lines)` pairs, rejecting repeated ids.
    pub fn from_entries<I>(entries: I) -> Result<Self, ClusterIdError>
    where
        I: IntoIterator<Item = (ClusterId, Vec<String>)>,
    {
        let mut result = Self::new();
        for (id, lines) in entries {
            result.insert(id, lines)?;
        }
        Ok(result)
    }

    pub fn insert(&mut self, id: ClusterId, lines: Vec<String>) -> Result<(), ClusterIdError> {
        if self.clusters.contains_key(&id) {
            return Err(ClusterIdError::Duplicate(id));
        }
        self.clusters.insert(id, lines);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn get(&self, id: ClusterId) -> Option<&[String]> {
        self.clusters.get(&id).map(Vec::as_slice)
    }

    /// Clusters in ascending numeric id order.
    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, &[String])> {
        self.clusters.iter().map(|(id, lines)| (*id, lines.as_slice()))
    }

    /// Rename every id to its display label. Lines are moved unchanged.
    pub fn relabel(self) -> DisplayClusterResult {
        let clusters = self
            .clusters
            .into_iter()
            .map(|(id, lines)| DisplayCluster {
                label: id.label(),
                id,
                lines,
            })
            .collect();
        DisplayClusterResult { clusters }
    }
}

/// One labelled cluster ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayCluster {
    pub label: String,
    pub id: ClusterId,
    pub lines: Vec<String>,
}

/// Clustering result with 1-based labels, in numeric order.
///
/// Serialized as an ordered array so label order survives JSON maps that
/// would otherwise sort `Cluster 10` before `Cluster 2`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayClusterResult {
    clusters: Vec<DisplayCluster>,
}

impl DisplayClusterResult {
    pub fn clusters(&self) -> &[DisplayCluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.clusters.iter().map(|c| c.label.as_str())
    }

    /// Lines of the cluster with the given label.
    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.clusters
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.lines.as_slice())
    }

    /// Total number of clustered lines.
    pub fn line_count(&self) -> usize {
        self.clusters.iter().map(|c| c.lines.len()).sum()
    }

    /// Size of the largest cluster.
    pub fn max_cluster_len(&self) -> usize {
        self.clusters.iter().map(|c| c.lines.len()).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_cluster_id() {
        assert_eq!("0".parse::<ClusterId>().unwrap(), ClusterId::new(0));
        assert_eq!("42".parse::<ClusterId>().unwrap().value(), 42);
        assert_eq!("007".parse::<ClusterId>().unwrap().value(), 7);
        assert!("-1".parse::<ClusterId>().is_err());
        assert!("+1".parse::<ClusterId>().is_err());
        assert!(" 1".parse::<ClusterId>().is_err());
        assert!("".parse::<ClusterId>().is_err());
        assert!("noise".parse::<ClusterId>().is_err());
        assert!("4294967296".parse::<ClusterId>().is_err());
    }

    #[test]
    fn test_label_is_one_based() {
        assert_eq!(ClusterId::new(0).label(), "Cluster 1");
        assert_eq!(ClusterId::new(9).label(), "Cluster 10");
        assert_eq!(ClusterId::new(u32::MAX).label(), "Cluster 4294967296");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = RawClusterResult::from_entries([
            (ClusterId::new(1), lines(&["a"])),
            (ClusterId::new(1), lines(&["b"])),
        ])
        .unwrap_err();
        assert_eq!(err, ClusterIdError::Duplicate(ClusterId::new(1)));
    }

    #[test]
    fn test_relabel_sorts_numerically() {
        let raw = RawClusterResult::from_entries([
            (ClusterId::new(10), lines(&["k"])),
            (ClusterId::new(2), lines(&["c"])),
            (ClusterId::new(9), lines(&["j"])),
        ])
        .unwrap();
        let display = raw.relabel();
        let labels: Vec<_> = display.labels().collect();
        assert_eq!(labels, vec!["Cluster 3", "Cluster 10", "Cluster 11"]);
        assert_eq!(display.get("Cluster 11").unwrap(), &["k"]);
    }

    #[test]
    fn test_display_serializes_in_order() {
        let raw = RawClusterResult::from_entries([
            (ClusterId::new(10), lines(&["late"])),
            (ClusterId::new(1), lines(&["early"])),
        ])
        .unwrap();
        let json = serde_json::to_value(raw.relabel()).unwrap();
        assert_eq!(json[0]["label"], "Cluster 2");
        assert_eq!(json[1]["label"], "Cluster 11");
        assert_eq!(json[1]["lines"][0], "late");
        assert_eq!(json[1]["id"], 10);
    }

    #[test]
    fn test_display_stats() {
        let raw = RawClusterResult::from_entries([
            (ClusterId::new(0), lines(&["a", "b", "c"])),
            (ClusterId::new(1), lines(&["d"])),
        ])
        .unwrap();
        let display = raw.relabel();
        assert_eq!(display.line_count(), 4);
        assert_eq!(display.max_cluster_len(), 3);
        assert_eq!(DisplayClusterResult::default().max_cluster_len(), 0);
    }

    proptest! {
        #[test]
        fn relabel_is_a_bijection(
            input in prop::collection::btree_map(any::<u32>(), prop::collection::vec(".*", 0..5), 0..20)
        ) {
            let raw = RawClusterResult::from_entries(
                input.iter().map(|(k, v)| (ClusterId::new(*k), v.clone())),
            ).unwrap();
            let display = raw.clone().relabel();

            prop_assert_eq!(display.len(), raw.len());
            for (cluster, (id, lines)) in display.clusters().iter().zip(raw.iter()) {
                let suffix: u64 = cluster.label.strip_prefix("Cluster ").unwrap().parse().unwrap();
                prop_assert_eq!(suffix, u64::from(id.value()) + 1);
                prop_assert_eq!(cluster.lines.as_slice(), lines);
            }
        }
    }
}
