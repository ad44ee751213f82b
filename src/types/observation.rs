//! Raw collaborator observations.
//!
//! Every commit contributes two observations (author side, committer side).
//! An observation is the (login, name, email) triple exactly as the record
//! presented it; identity resolution decides which observations belong to
//! the same person.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A (login, name, email) triple seen on one side of one commit.
///
/// Missing fields degrade to empty strings. Empty fields never participate
/// in identity matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    /// Forge account login, empty when the commit is unassociated.
    pub login: String,
    /// Display name from the commit signature.
    pub name: String,
    /// Email from the commit signature.
    pub email: String,
}

impl Observation {
    /// Create an observation from its three fields.
    pub fn new(login: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// True when all three fields are empty.
    ///
    /// Anonymous observations form singleton identities and never merge,
    /// so two of them looking identical is not a match.
    pub fn is_anonymous(&self) -> bool {
        self.login.is_empty() && self.name.is_empty() && self.email.is_empty()
    }

    /// Case-folded login, `None` when empty.
    pub(crate) fn login_key(&self) -> Option<String> {
        field_key(&self.login)
    }

    /// Case-folded name, `None` when empty.
    pub(crate) fn name_key(&self) -> Option<String> {
        field_key(&self.name)
    }

    /// Case-folded email, `None` when empty.
    pub(crate) fn email_key(&self) -> Option<String> {
        field_key(&self.email)
    }

    /// The case-folded form of the whole triple, used as a lookup key.
    pub(crate) fn normalized(&self) -> Observation {
        Observation {
            login: self.login.to_lowercase(),
            name: self.name.to_lowercase(),
            email: self.email.to_lowercase(),
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.login, self.name, self.email)
    }
}

fn field_key(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_lowercase())
    }
}
