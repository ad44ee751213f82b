//! File lineage graph: every change event, linked to the edits it revises.
//!
//! ## Algorithm
//!
//! Pass one walks commits in record order and emits one event per counted
//! file change. Pass two resolves, for every non-added event, the nearest
//! ancestor commits that touched the same basename and links their events
//! to it. Rename events are reachable under both their old and new names,
//! so lineage survives moves.
//!
//! Events here are a view over the same lineage resolution the co-edition
//! builder performs, so changes skipped by an extension filter are dropped
//! silently rather than tallied twice.
//!
//! ## Determinism Guarantees
//!
//! Events follow record order, predecessor sets iterate in node order, and
//! the graph hash covers both vectors. Same records, same filter: same
//! hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::coedition::ExtensionFilter;
use crate::dag::{CommitDag, NodeId};
use crate::fingerprint::fingerprint_hex;
use crate::lineage::{basename, LineageResolver};
use crate::store::CommitStore;
use crate::types::{ChangeStatus, IdentityId};

/// One file change event in a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEvent {
    /// Commit the change belongs to.
    pub sha: String,
    /// Path of the file after the change.
    pub path: String,
    /// What happened to the file.
    pub status: ChangeStatus,
    /// Identity that authored the change.
    pub author: IdentityId,
    /// When the change was authored, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Per-file edit history across a project, as a DAG of change events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLineageGraph {
    events: Vec<FileEvent>,
    edges: Vec<(usize, usize)>,
    graph_hash: String,
}

impl FileLineageGraph {
    /// Build the file lineage graph for a project.
    ///
    /// `filter` restricts which changes become events; skipped changes are
    /// not recorded anywhere.
    pub fn build(
        store: &CommitStore,
        dag: &CommitDag,
        lineage: &mut LineageResolver<'_>,
        filter: Option<&ExtensionFilter>,
    ) -> Self {
        let mut events: Vec<FileEvent> = Vec::new();
        // Event index per commit and basename; first change wins when a
        // commit touches two files with the same basename.
        let mut located: Vec<HashMap<String, usize>> = vec![HashMap::new(); dag.len()];
        // Non-added events still awaiting their incoming edges.
        let mut pending: Vec<(usize, NodeId, String)> = Vec::new();

        for id in dag.node_ids() {
            let node = dag.node(id);
            let Some(record) = store.get(&node.sha) else {
                continue;
            };
            let Some(changes) = &record.files else {
                continue;
            };
            for change in changes {
                if let Some(filter) = filter {
                    if !filter.allows(&change.filename) {
                        continue;
                    }
                }
                let index = events.len();
                events.push(FileEvent {
                    sha: node.sha.clone(),
                    path: change.filename.clone(),
                    status: change.status.clone(),
                    author: node.author,
                    occurred_at: node.authored_at,
                });
                located[id.index()]
                    .entry(basename(&change.filename).to_string())
                    .or_insert(index);
                if let Some(previous) = &change.previous_filename {
                    located[id.index()]
                        .entry(basename(previous).to_string())
                        .or_insert(index);
                }
                if !change.status.is_added() {
                    pending.push((index, id, change.lookup_path().to_string()));
                }
            }
        }

        let mut edges: Vec<(usize, usize)> = Vec::new();
        for (index, id, path) in pending {
            let name = basename(&path);
            for &predecessor in &lineage.predecessors(id, &path) {
                if let Some(&earlier) = located[predecessor.index()].get(name) {
                    edges.push((earlier, index));
                }
            }
        }

        tracing::debug!(
            events = events.len(),
            edges = edges.len(),
            "file lineage graph built"
        );

        let graph_hash = fingerprint_hex(&(&events, &edges));
        Self {
            events,
            edges,
            graph_hash,
        }
    }

    /// All change events, in record order.
    pub fn events(&self) -> &[FileEvent] {
        &self.events
    }

    /// Edges from an earlier event to the event that revises it.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Number of change events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Number of lineage edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Indices of events touching a file with the same basename as `path`.
    pub fn history_of(&self, path: &str) -> Vec<usize> {
        let name = basename(path);
        self.events
            .iter()
            .enumerate()
            .filter(|(_, event)| basename(&event.path) == name)
            .map(|(index, _)| index)
            .collect()
    }

    /// Deterministic hash of the graph content.
    pub fn graph_hash(&self) -> &str {
        &self.graph_hash
    }
}
