//! File lineage resolution.
//!
//! Answers the question: given a commit and a file path, which ancestor
//! commit(s) most recently touched that file? Matching is by basename
//! rather than full path, so directory moves do not sever lineage; rename
//! records make a commit touch the file under both its old and new names.
//!
//! ## Algorithm
//!
//! Explicit worklist depth-first walk over parents (never call-stack
//! recursion; large histories would overflow it). For each ancestor: if it
//! touches the queried basename it terminates that branch; otherwise the
//! walk continues into its parents. A parentless ancestor without a match
//! ends the branch empty, meaning the introducing change lies outside the
//! fetched history.
//!
//! Results are memoized per (commit, basename) for the lifetime of the
//! resolver. Merge-heavy topologies revisit the same ancestors once per
//! branch, and the memo is what keeps the walk polynomial. The memo is
//! scoped to one project run and dies with the resolver.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::dag::{CommitDag, NodeId};
use crate::store::CommitStore;

/// The final component of a path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

enum Frame {
    Enter(NodeId),
    Combine(NodeId),
}

/// Memoized lineage queries over one commit DAG.
pub struct LineageResolver<'a> {
    dag: &'a CommitDag,
    /// Basenames touched by each node, renames under both names.
    touched: Vec<HashSet<String>>,
    /// Per node: basename → nearest touching ancestors at-or-above it.
    memo: Vec<HashMap<String, BTreeSet<NodeId>>>,
}

impl<'a> LineageResolver<'a> {
    /// Precompute the touched-basename sets; the memo starts empty.
    pub fn new(dag: &'a CommitDag, store: &CommitStore) -> Self {
        let mut touched: Vec<HashSet<String>> = vec![HashSet::new(); dag.len()];
        for node_id in dag.node_ids() {
            let Some(record) = store.get(&dag.node(node_id).sha) else {
                continue;
            };
            let Some(files) = &record.files else {
                continue;
            };
            let names = &mut touched[node_id.index()];
            for change in files {
                names.insert(basename(&change.filename).to_string());
                if let Some(previous) = &change.previous_filename {
                    names.insert(basename(previous).to_string());
                }
            }
        }

        Self {
            dag,
            touched,
            memo: vec![HashMap::new(); dag.len()],
        }
    }

    /// Whether the commit touches a file with the given basename.
    pub fn touches(&self, node: NodeId, name: &str) -> bool {
        self.touched[node.index()].contains(name)
    }

    /// The nearest ancestors of `node` that touched a file with `path`'s
    /// basename, one or more per parent branch that has any.
    ///
    /// The queried commit itself never appears in the result. An empty set
    /// means every branch ran off the fetched history without a match.
    pub fn predecessors(&mut self, node: NodeId, path: &str) -> BTreeSet<NodeId> {
        let name = basename(path);
        self.ensure_parent_entries(node, name);

        let mut result = BTreeSet::new();
        for &parent in self.dag.parents(node) {
            if let Some(hits) = self.memo[parent.index()].get(name) {
                result.extend(hits.iter().copied());
            }
        }
        result
    }

    /// Fill the memo for every ancestor entry the query needs.
    fn ensure_parent_entries(&mut self, node: NodeId, name: &str) {
        let mut stack: Vec<Frame> = self
            .dag
            .parents(node)
            .iter()
            .map(|&parent| Frame::Enter(parent))
            .collect();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(n) => {
                    if self.memo[n.index()].contains_key(name) {
                        continue;
                    }
                    if self.touches(n, name) {
                        let mut hit = BTreeSet::new();
                        hit.insert(n);
                        self.memo[n.index()].insert(name.to_string(), hit);
                        continue;
                    }
                    let parents = self.dag.parents(n);
                    if parents.is_empty() {
                        tracing::debug!(
                            sha = %self.dag.node(n).short_sha,
                            file = name,
                            "lineage walk reached a root without a match"
                        );
                        self.memo[n.index()].insert(name.to_string(), BTreeSet::new());
                        continue;
                    }
                    stack.push(Frame::Combine(n));
                    for &parent in parents {
                        if !self.memo[parent.index()].contains_key(name) {
                            stack.push(Frame::Enter(parent));
                        }
                    }
                }
                Frame::Combine(n) => {
                    let mut union = BTreeSet::new();
                    for &parent in self.dag.parents(n) {
                        if let Some(hits) = self.memo[parent.index()].get(name) {
                            union.extend(hits.iter().copied());
                        }
                    }
                    self.memo[n.index()].insert(name.to_string(), union);
                }
            }
        }
    }
}
