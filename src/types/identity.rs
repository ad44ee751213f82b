//! Resolved collaborator identities.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::types::Observation;

/// Dense identifier for a resolved identity.
///
/// Identifiers are assigned in first-seen order during resolution, so they
/// are reproducible across runs on the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityId(u32);

impl IdentityId {
    /// Create an identifier from its raw index.
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw index.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// The raw index as a usize, for dense table lookups.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique collaborator.
///
/// Carries the union of every login, name, and email observed across the
/// merged observations, with original casing preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Identity identifier (first-seen order).
    pub id: IdentityId,
    /// All observed logins.
    pub logins: BTreeSet<String>,
    /// All observed display names.
    pub names: BTreeSet<String>,
    /// All observed emails.
    pub emails: BTreeSet<String>,
}

impl Identity {
    /// Create an empty identity with the given identifier.
    pub(crate) fn new(id: IdentityId) -> Self {
        Self {
            id,
            logins: BTreeSet::new(),
            names: BTreeSet::new(),
            emails: BTreeSet::new(),
        }
    }

    /// Record the non-empty fields of an observation.
    pub(crate) fn absorb(&mut self, observation: &Observation) {
        if !observation.login.is_empty() {
            self.logins.insert(observation.login.clone());
        }
        if !observation.name.is_empty() {
            self.names.insert(observation.name.clone());
        }
        if !observation.email.is_empty() {
            self.emails.insert(observation.email.clone());
        }
    }

    /// Whether no field was ever observed for this identity.
    pub fn is_anonymous(&self) -> bool {
        self.logins.is_empty() && self.names.is_empty() && self.emails.is_empty()
    }

    /// A human-readable label: the first login, else the first name, else
    /// the first email, else a placeholder derived from the identifier.
    pub fn label(&self) -> String {
        self.logins
            .iter()
            .next()
            .or_else(|| self.names.iter().next())
            .or_else(|| self.emails.iter().next())
            .cloned()
            .unwrap_or_else(|| format!("anonymous-{}", self.id))
    }
}
