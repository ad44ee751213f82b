//! Commit nodes of the ancestry DAG.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::IdentityId;

/// Length of the abbreviated commit identifier.
const SHORT_SHA_LEN: usize = 7;

/// A commit in the ancestry DAG, with identities resolved.
///
/// Built once by the DAG builder and immutable afterward. Every field other
/// than `sha` degrades gracefully when the record lacked it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitNode {
    /// Full commit identifier.
    pub sha: String,
    /// Abbreviated identifier (first 7 characters).
    pub short_sha: String,
    /// Resolved author identity.
    pub author: IdentityId,
    /// Resolved committer identity.
    pub committer: IdentityId,
    /// Commit message, empty when absent.
    pub message: String,
    /// Author signature timestamp.
    pub authored_at: Option<DateTime<Utc>>,
    /// Committer signature timestamp.
    pub committed_at: Option<DateTime<Utc>>,
    /// API URL, empty when absent.
    pub url: String,
    /// Number of file changes; `None` when the record carried no file list.
    pub affected_files: Option<u32>,
}

impl CommitNode {
    /// Abbreviate a commit identifier.
    pub fn short(sha: &str) -> String {
        sha.chars().take(SHORT_SHA_LEN).collect()
    }
}

// Equality and ordering by identifier, for deterministic sorting.
impl PartialEq for CommitNode {
    fn eq(&self, other: &Self) -> bool {
        self.sha == other.sha
    }
}

impl Eq for CommitNode {}

impl PartialOrd for CommitNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CommitNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sha.cmp(&other.sha)
    }
}
