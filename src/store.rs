//! In-memory commit store.
//!
//! The validated, indexed view over one project's ingested records:
//! input-order iteration plus O(1) lookup by commit identifier. Validation
//! drops and counts rather than fails; a record with an identifier is always
//! kept, whatever else it lacks.

use std::collections::HashMap;

use crate::types::{CommitRecord, RunStats};

/// Immutable record collection for one project run.
///
/// Records without an identifier are dropped as malformed; a repeated
/// identifier keeps the first record and drops the rest as duplicates.
/// Record-shape counters (missing logins, missing file lists) are taken
/// here, once per kept record.
#[derive(Debug, Clone)]
pub struct CommitStore {
    records: Vec<CommitRecord>,
    index: HashMap<String, usize>,
}

impl CommitStore {
    /// Validate and index a record collection, counting drops into `stats`.
    pub fn from_records(records: Vec<CommitRecord>, stats: &mut RunStats) -> Self {
        stats.total_records += records.len() as u64;

        let mut kept: Vec<CommitRecord> = Vec::with_capacity(records.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());

        for record in records {
            let sha = match record.sha.as_deref() {
                Some(sha) if !sha.is_empty() => sha.to_string(),
                _ => {
                    stats.malformed_records += 1;
                    tracing::warn!("dropping commit record without identifier");
                    continue;
                }
            };
            if index.contains_key(&sha) {
                stats.duplicate_records += 1;
                tracing::warn!(sha = %sha, "dropping duplicate commit record");
                continue;
            }

            if record.author_observation().login.is_empty() {
                stats.missing_author_login += 1;
            }
            if record.committer_observation().login.is_empty() {
                stats.missing_committer_login += 1;
            }
            if record.files.is_none() {
                stats.missing_files += 1;
            }

            index.insert(sha, kept.len());
            kept.push(record);
        }

        Self {
            records: kept,
            index,
        }
    }

    /// Number of kept records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record survived validation.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by commit identifier.
    pub fn get(&self, sha: &str) -> Option<&CommitRecord> {
        self.index.get(sha).map(|&pos| &self.records[pos])
    }

    /// Whether the store holds the given commit.
    pub fn contains(&self, sha: &str) -> bool {
        self.index.contains_key(sha)
    }

    /// Kept records in input order.
    pub fn records(&self) -> &[CommitRecord] {
        &self.records
    }

    /// Iterate kept records in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, CommitRecord> {
        self.records.iter()
    }
}
