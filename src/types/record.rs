//! Commit record wire types.
//!
//! These mirror the JSON shape of per-commit objects as delivered by a hosted
//! forge API: a top-level `sha`, a nested `commit` payload with name/email
//! signatures, nullable top-level account references, parent references, and
//! an optional per-file change list. Every field except `sha` degrades
//! gracefully when absent, so partially-fetched dumps still ingest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Observation;

/// A top-level account reference (`author` / `committer`).
///
/// The whole object is `null` when the commit is not associated with a forge
/// account; `login` alone can also be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    /// Account login.
    #[serde(default)]
    pub login: Option<String>,
}

/// A name/email/date signature nested under `commit.author` or
/// `commit.committer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Display name as configured in the committing client.
    #[serde(default)]
    pub name: Option<String>,
    /// Email as configured in the committing client.
    #[serde(default)]
    pub email: Option<String>,
    /// Signature timestamp (RFC 3339).
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// The nested `commit` payload: signatures and message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetail {
    /// Author signature.
    #[serde(default)]
    pub author: Option<Signature>,
    /// Committer signature.
    #[serde(default)]
    pub committer: Option<Signature>,
    /// Commit message.
    #[serde(default)]
    pub message: Option<String>,
}

/// A parent reference inside the `parents` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    /// Identifier of the parent commit.
    #[serde(default)]
    pub sha: Option<String>,
}

impl ParentRef {
    /// Create a parent reference to the given commit identifier.
    pub fn new(sha: impl Into<String>) -> Self {
        Self {
            sha: Some(sha.into()),
        }
    }
}

/// Status of one file change within a commit.
///
/// Statuses this crate does not interpret (`changed`, `copied`, ...) are
/// preserved verbatim and treated as non-`added`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChangeStatus {
    /// File created in this commit.
    Added,
    /// File content modified.
    Modified,
    /// File deleted.
    Removed,
    /// File moved; `previous_filename` carries the old path.
    Renamed,
    /// Any status not interpreted by this crate.
    Other(String),
}

impl ChangeStatus {
    /// Whether this change creates the file.
    ///
    /// Added changes never have a predecessor edit and never contribute
    /// co-edition edges.
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added)
    }

    /// Whether this change is a rename.
    pub fn is_renamed(&self) -> bool {
        matches!(self, Self::Renamed)
    }
}

impl From<String> for ChangeStatus {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "added" => Self::Added,
            "modified" => Self::Modified,
            "removed" => Self::Removed,
            "renamed" => Self::Renamed,
            _ => Self::Other(s),
        }
    }
}

impl From<ChangeStatus> for String {
    fn from(status: ChangeStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Modified => write!(f, "modified"),
            Self::Removed => write!(f, "removed"),
            Self::Renamed => write!(f, "renamed"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// One file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path of the file after this commit.
    #[serde(default)]
    pub filename: String,
    /// Change status.
    pub status: ChangeStatus,
    /// Path before this commit; present only on renames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_filename: Option<String>,
}

impl FileChange {
    /// Create a change with the given status and path.
    pub fn new(status: ChangeStatus, filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status,
            previous_filename: None,
        }
    }

    /// Create a rename change from `previous` to `filename`.
    pub fn renamed(filename: impl Into<String>, previous: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: ChangeStatus::Renamed,
            previous_filename: Some(previous.into()),
        }
    }

    /// The path under which ancestor commits knew this file.
    ///
    /// For renames that is the previous path; for everything else the
    /// current one. Lineage lookups start from this path.
    pub fn lookup_path(&self) -> &str {
        match (&self.status, &self.previous_filename) {
            (ChangeStatus::Renamed, Some(previous)) => previous,
            _ => &self.filename,
        }
    }
}

/// One commit as delivered by the forge API.
///
/// `sha` is the only field ingestion requires; records without it are
/// counted as malformed and dropped at the store boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Commit identifier (content hash).
    #[serde(default)]
    pub sha: Option<String>,
    /// API URL of this commit.
    #[serde(default)]
    pub url: Option<String>,
    /// Parent references, oldest-branch first as delivered.
    #[serde(default)]
    pub parents: Vec<ParentRef>,
    /// Nested commit payload.
    #[serde(default)]
    pub commit: Option<CommitDetail>,
    /// Top-level author account; `null` when unassociated.
    #[serde(default)]
    pub author: Option<ActorRef>,
    /// Top-level committer account; `null` when unassociated.
    #[serde(default)]
    pub committer: Option<ActorRef>,
    /// Per-file change list; absent on some records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileChange>>,
}

impl CommitRecord {
    /// Create a minimal record with the given identifier.
    pub fn new(sha: impl Into<String>) -> Self {
        Self {
            sha: Some(sha.into()),
            ..Self::default()
        }
    }

    /// Add a parent reference.
    pub fn with_parent(mut self, sha: impl Into<String>) -> Self {
        self.parents.push(ParentRef::new(sha));
        self
    }

    /// Set the author observation (login, name, email). Empty strings mean
    /// "not present".
    pub fn with_author(mut self, login: &str, name: &str, email: &str) -> Self {
        self.author = actor(login);
        self.commit_mut().author = signature(name, email);
        self
    }

    /// Set the committer observation (login, name, email). Empty strings
    /// mean "not present".
    pub fn with_committer(mut self, login: &str, name: &str, email: &str) -> Self {
        self.committer = actor(login);
        self.commit_mut().committer = signature(name, email);
        self
    }

    /// Set the commit message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.commit_mut().message = Some(message.into());
        self
    }

    /// Set the API URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set both signature timestamps.
    pub fn with_dates(mut self, authored: DateTime<Utc>, committed: DateTime<Utc>) -> Self {
        self.commit_mut()
            .author
            .get_or_insert_with(Signature::default)
            .date = Some(authored);
        self.commit_mut()
            .committer
            .get_or_insert_with(Signature::default)
            .date = Some(committed);
        self
    }

    /// Append a file change.
    pub fn with_change(mut self, change: FileChange) -> Self {
        self.files.get_or_insert_with(Vec::new).push(change);
        self
    }

    /// The author-side observation of this record.
    pub fn author_observation(&self) -> Observation {
        observation_of(
            self.author.as_ref(),
            self.commit.as_ref().and_then(|c| c.author.as_ref()),
        )
    }

    /// The committer-side observation of this record.
    pub fn committer_observation(&self) -> Observation {
        observation_of(
            self.committer.as_ref(),
            self.commit.as_ref().and_then(|c| c.committer.as_ref()),
        )
    }

    /// Commit message, empty when absent.
    pub fn message(&self) -> &str {
        self.commit
            .as_ref()
            .and_then(|c| c.message.as_deref())
            .unwrap_or("")
    }

    /// Author signature timestamp.
    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        self.commit
            .as_ref()
            .and_then(|c| c.author.as_ref())
            .and_then(|s| s.date)
    }

    /// Committer signature timestamp.
    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        self.commit
            .as_ref()
            .and_then(|c| c.committer.as_ref())
            .and_then(|s| s.date)
    }

    fn commit_mut(&mut self) -> &mut CommitDetail {
        self.commit.get_or_insert_with(CommitDetail::default)
    }
}

fn actor(login: &str) -> Option<ActorRef> {
    if login.is_empty() {
        None
    } else {
        Some(ActorRef {
            login: Some(login.to_string()),
        })
    }
}

fn signature(name: &str, email: &str) -> Option<Signature> {
    Some(Signature {
        name: if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        },
        email: if email.is_empty() {
            None
        } else {
            Some(email.to_string())
        },
        date: None,
    })
}

fn observation_of(actor: Option<&ActorRef>, signature: Option<&Signature>) -> Observation {
    Observation::new(
        actor.and_then(|a| a.login.as_deref()).unwrap_or(""),
        signature.and_then(|s| s.name.as_deref()).unwrap_or(""),
        signature.and_then(|s| s.email.as_deref()).unwrap_or(""),
    )
}
