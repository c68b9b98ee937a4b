//! The ordered set of text lines a session clusters.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of lines below which clustering is unlikely to be meaningful.
pub const RECOMMENDED_MIN_LINES: usize = 5;

/// Ordered text lines loaded into a session.
///
/// Order is kept exactly as acquired. A working set is never edited in
/// place; sessions replace or discard it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkingSet {
    lines: Vec<String>,
}

impl WorkingSet {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the set has at least `min` lines. Advisory only.
    pub fn meets_recommended_size(&self, min: usize) -> bool {
        self.lines.len() >= min
    }

    /// Distinct lines, for membership checks against engine output.
    pub fn line_index(&self) -> HashSet<&str> {
        self.lines.iter().map(String::as_str).collect()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl From<Vec<String>> for WorkingSet {
    fn from(lines: Vec<String>) -> Self {
        Self::new(lines)
    }
}
