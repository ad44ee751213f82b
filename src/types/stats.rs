//! Run statistics.
//!
//! Every non-fatal data-quality finding is counted here rather than raised
//! as an error. The counters are the only mechanism by which anomalies are
//! surfaced to the operator, so builders must never swallow one silently.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Data-quality counters accumulated over one project run.
///
/// Reports from several runs can be combined with [`RunStats::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Records presented to the store, before validation.
    pub total_records: u64,
    /// Records dropped for missing an identifier.
    pub malformed_records: u64,
    /// Records dropped for repeating an already-seen identifier.
    pub duplicate_records: u64,
    /// Kept records whose author has no account login.
    pub missing_author_login: u64,
    /// Kept records whose committer has no account login.
    pub missing_committer_login: u64,
    /// Kept records with no file change list at all.
    pub missing_files: u64,
    /// Parent references that resolve to no known commit.
    pub dangling_parents: u64,
    /// Modified/renamed changes whose lineage walk found no predecessor.
    pub lineage_zero_results: u64,
    /// Modified/renamed changes whose lineage walk found more predecessors
    /// than the commit has parents.
    pub lineage_overcounts: u64,
    /// Changes skipped by the extension filter, tallied per extension.
    pub filtered_changes: BTreeMap<String, u64>,
}

impl RunStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: &RunStats) {
        self.total_records += other.total_records;
        self.malformed_records += other.malformed_records;
        self.duplicate_records += other.duplicate_records;
        self.missing_author_login += other.missing_author_login;
        self.missing_committer_login += other.missing_committer_login;
        self.missing_files += other.missing_files;
        self.dangling_parents += other.dangling_parents;
        self.lineage_zero_results += other.lineage_zero_results;
        self.lineage_overcounts += other.lineage_overcounts;
        for (extension, count) in &other.filtered_changes {
            *self.filtered_changes.entry(extension.clone()).or_default() += count;
        }
    }

    /// Total changes skipped by the extension filter.
    pub fn filtered_total(&self) -> u64 {
        self.filtered_changes.values().sum()
    }

    /// Whether any anomaly counter is non-zero.
    pub fn has_anomalies(&self) -> bool {
        self.malformed_records > 0
            || self.duplicate_records > 0
            || self.dangling_parents > 0
            || self.lineage_zero_results > 0
            || self.lineage_overcounts > 0
    }
}
