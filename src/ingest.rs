//! Parsing of raw forge API payloads into commit records.
//!
//! Parsing is deliberately permissive: every record field is optional at
//! the JSON level, and unknown change statuses pass through verbatim.
//! Structural damage (records missing their sha, duplicate shas) is the
//! store's concern, not the parser's.

use thiserror::Error;

use crate::types::CommitRecord;

/// Errors arising while parsing raw commit payloads.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The payload was not valid JSON or did not match the record shape.
    #[error("invalid commit record payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a JSON array of per-commit records.
pub fn parse_records(payload: &str) -> Result<Vec<CommitRecord>, IngestError> {
    Ok(serde_json::from_str(payload)?)
}

/// Parse a single per-commit record.
pub fn parse_record(payload: &str) -> Result<CommitRecord, IngestError> {
    Ok(serde_json::from_str(payload)?)
}
