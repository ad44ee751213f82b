//! Collaborator identity resolution.
//!
//! Commit records present authors and committers as loose (login, name,
//! email) triples, and the same person routinely appears under several of
//! them. This module merges all observations of one person into a single
//! identity: two observations belong together iff they share a non-empty
//! login OR name OR email, case-insensitively, transitively closed.
//!
//! ## Algorithm
//!
//! 1. Push two observations per record (author side, committer side) into a
//!    union-find arena, in input order
//! 2. For each non-empty field, union the new observation with the first
//!    observation that presented the same case-folded value
//! 3. Materialize one identity per component, numbered in first-seen order,
//!    absorbing the logins/names/emails of every member observation
//!
//! Anonymous observations (all three fields empty) match nothing and come
//! out as singleton identities.

mod union_find;

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::store::CommitStore;
use crate::types::{Identity, IdentityId, Observation};
use union_find::UnionFind;

/// The resolved identity table for one project run.
///
/// Built once by [`IdentityTable::resolve`] and read-only afterward. Every
/// downstream stage refers to collaborators through [`IdentityId`]s handed
/// out here.
#[derive(Debug, Clone)]
pub struct IdentityTable {
    identities: Vec<Identity>,
    by_observation: HashMap<Observation, IdentityId>,
    author_of: Vec<IdentityId>,
    committer_of: Vec<IdentityId>,
}

impl IdentityTable {
    /// Resolve the identities of every observation in the store.
    pub fn resolve(store: &CommitStore) -> Self {
        let mut merger = Merger::with_capacity(store.len() * 2);

        let mut author_slots: Vec<u32> = Vec::with_capacity(store.len());
        let mut committer_slots: Vec<u32> = Vec::with_capacity(store.len());
        for record in store.iter() {
            author_slots.push(merger.insert(record.author_observation()));
            committer_slots.push(merger.insert(record.committer_observation()));
        }

        // One identity per component, numbered in first-seen order.
        let mut identities: Vec<Identity> = Vec::new();
        let mut component_ids: HashMap<u32, IdentityId> = HashMap::new();
        let mut id_of_slot: Vec<IdentityId> = Vec::with_capacity(merger.observations.len());
        for slot in 0..merger.observations.len() as u32 {
            let root = merger.arena.find(slot);
            let id = *component_ids.entry(root).or_insert_with(|| {
                let id = IdentityId::new(identities.len() as u32);
                identities.push(Identity::new(id));
                id
            });
            identities[id.index()].absorb(&merger.observations[slot as usize]);
            id_of_slot.push(id);
        }

        // Triple lookup covers non-anonymous observations only: two
        // anonymous triples look identical but are distinct people.
        let mut by_observation: HashMap<Observation, IdentityId> = HashMap::new();
        for (slot, observation) in merger.observations.iter().enumerate() {
            if !observation.is_anonymous() {
                by_observation
                    .entry(observation.normalized())
                    .or_insert(id_of_slot[slot]);
            }
        }

        let author_of: Vec<IdentityId> = author_slots
            .iter()
            .map(|&slot| id_of_slot[slot as usize])
            .collect();
        let committer_of: Vec<IdentityId> = committer_slots
            .iter()
            .map(|&slot| id_of_slot[slot as usize])
            .collect();

        tracing::debug!(
            observations = merger.observations.len(),
            identities = identities.len(),
            "resolved collaborator identities"
        );

        Self {
            identities,
            by_observation,
            author_of,
            committer_of,
        }
    }

    /// Number of resolved identities.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Look up an identity by identifier.
    pub fn get(&self, id: IdentityId) -> Option<&Identity> {
        self.identities.get(id.index())
    }

    /// All identities, ordered by identifier.
    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    /// Resolve a non-anonymous observation triple to its identity.
    ///
    /// Anonymous triples return `None`; they are only resolvable
    /// positionally, through [`IdentityTable::authors`] /
    /// [`IdentityTable::committers`].
    pub fn identity_of(&self, observation: &Observation) -> Option<IdentityId> {
        if observation.is_anonymous() {
            return None;
        }
        self.by_observation.get(&observation.normalized()).copied()
    }

    /// Author identity of each store record, by position.
    pub fn authors(&self) -> &[IdentityId] {
        &self.author_of
    }

    /// Committer identity of each store record, by position.
    pub fn committers(&self) -> &[IdentityId] {
        &self.committer_of
    }
}

/// Accumulates observations into union-find components.
struct Merger {
    arena: UnionFind,
    observations: Vec<Observation>,
    by_login: HashMap<String, u32>,
    by_name: HashMap<String, u32>,
    by_email: HashMap<String, u32>,
}

impl Merger {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: UnionFind::with_capacity(capacity),
            observations: Vec::with_capacity(capacity),
            by_login: HashMap::new(),
            by_name: HashMap::new(),
            by_email: HashMap::new(),
        }
    }

    /// Add an observation, merging it with earlier ones that share a field.
    fn insert(&mut self, observation: Observation) -> u32 {
        let slot = self.arena.push();

        if let Some(key) = observation.login_key() {
            match self.by_login.entry(key) {
                Entry::Occupied(first) => {
                    self.arena.union(slot, *first.get());
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(slot);
                }
            }
        }
        if let Some(key) = observation.name_key() {
            match self.by_name.entry(key) {
                Entry::Occupied(first) => {
                    self.arena.union(slot, *first.get());
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(slot);
                }
            }
        }
        if let Some(key) = observation.email_key() {
            match self.by_email.entry(key) {
                Entry::Occupied(first) => {
                    self.arena.union(slot, *first.get());
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(slot);
                }
            }
        }

        self.observations.push(observation);
        slot
    }
}
