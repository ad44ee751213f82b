//! Co-edition graph: who edits whose work, and how often.
//!
//! ## Algorithm
//!
//! For every file change in every commit, the builder resolves the nearest
//! ancestor commits that touched the same basename and draws one weighted
//! edge per predecessor, from the predecessor's author identity to the
//! editing commit's author identity. When the predecessor was committed by
//! someone other than its author, the committer earns a parallel edge,
//! since pushing a change into history is a form of stewardship over it.
//! A record that never said who committed resolves to an anonymous
//! committer identity, and anonymous committers earn nothing.
//!
//! Newly added files have no predecessor and contribute no edges. Changes
//! can be restricted by file extension; skipped changes are tallied per
//! extension in the run statistics.
//!
//! ## Anomaly handling
//!
//! Modified and renamed changes are expected to have lineage. A resolution
//! that comes back empty, or that returns more predecessors than the
//! commit has parents, is counted as an anomaly and contributes no edges.
//! Removed and unrecognized statuses carry no such expectation and are
//! never flagged.
//!
//! ## Determinism Guarantees
//!
//! Node and edge vectors are ordered by identity, edge weights accumulate
//! in a `BTreeMap`, and the graph hash is computed over the canonical JSON
//! of both vectors. Same records, same policy: same hash.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dag::CommitDag;
use crate::fingerprint::fingerprint_hex;
use crate::identity::IdentityTable;
use crate::lineage::LineageResolver;
use crate::store::CommitStore;
use crate::types::{ChangeStatus, IdentityId, RunStats};

mod policy;

pub use policy::{CoEditionPolicy, ExtensionFilter};

/// A collaborator in the co-edition graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoEditionNode {
    /// The resolved identity this node stands for.
    pub identity: IdentityId,
    /// Number of commits authored by this identity.
    pub commits: u32,
    /// Number of counted file changes in commits authored by this identity.
    pub file_changes: u32,
}

/// A weighted directed edge: `source` edited work later revised by `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoEditionEdge {
    /// Identity whose earlier edit was revised.
    pub source: IdentityId,
    /// Identity that authored the revising commit.
    pub target: IdentityId,
    /// Number of file-change events backing this edge.
    pub weight: u64,
}

/// The weighted directed collaboration graph of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoEditionGraph {
    nodes: Vec<CoEditionNode>,
    edges: Vec<CoEditionEdge>,
    policy_hash: String,
    graph_hash: String,
}

#[derive(Default)]
struct NodeTally {
    commits: u32,
    file_changes: u32,
}

impl CoEditionGraph {
    /// Build the co-edition graph for a project.
    ///
    /// Commits are visited in record order. The resolver's memo persists
    /// across calls, so passing the same resolver to later builders reuses
    /// the lineage already computed here.
    pub fn build(
        store: &CommitStore,
        dag: &CommitDag,
        identities: &IdentityTable,
        lineage: &mut LineageResolver<'_>,
        policy: &CoEditionPolicy,
        stats: &mut RunStats,
    ) -> Self {
        let mut tallies: BTreeMap<IdentityId, NodeTally> = BTreeMap::new();
        let mut weights: BTreeMap<(IdentityId, IdentityId), u64> = BTreeMap::new();

        for id in dag.node_ids() {
            let node = dag.node(id);
            let author = node.author;
            tallies.entry(author).or_default().commits += 1;

            let Some(record) = store.get(&node.sha) else {
                continue;
            };
            let Some(changes) = &record.files else {
                continue;
            };

            for change in changes {
                if let Some(filter) = &policy.extension_filter {
                    if !filter.allows(&change.filename) {
                        let extension = ExtensionFilter::extension_of(&change.filename);
                        *stats.filtered_changes.entry(extension).or_insert(0) += 1;
                        continue;
                    }
                }
                tallies.entry(author).or_default().file_changes += 1;

                if change.status.is_added() {
                    continue;
                }

                let predecessors = lineage.predecessors(id, change.lookup_path());
                let expects_lineage = matches!(
                    change.status,
                    ChangeStatus::Modified | ChangeStatus::Renamed
                );

                if predecessors.is_empty() {
                    if expects_lineage {
                        stats.lineage_zero_results += 1;
                        tracing::warn!(
                            sha = %node.short_sha,
                            file = %change.filename,
                            "no lineage found for a modified file"
                        );
                    }
                    continue;
                }
                if expects_lineage && predecessors.len() > dag.parents(id).len() {
                    stats.lineage_overcounts += 1;
                    tracing::warn!(
                        sha = %node.short_sha,
                        file = %change.filename,
                        found = predecessors.len(),
                        parents = dag.parents(id).len(),
                        "lineage returned more predecessors than parents"
                    );
                    continue;
                }

                for &predecessor in &predecessors {
                    let earlier = dag.node(predecessor);
                    add_edge(&mut weights, policy, earlier.author, author);
                    if policy.credit_committer
                        && earlier.committer != earlier.author
                        && !is_anonymous(identities, earlier.committer)
                    {
                        add_edge(&mut weights, policy, earlier.committer, author);
                    }
                }
            }
        }

        for (source, target) in weights.keys() {
            tallies.entry(*source).or_default();
            tallies.entry(*target).or_default();
        }

        let nodes: Vec<CoEditionNode> = tallies
            .into_iter()
            .map(|(identity, tally)| CoEditionNode {
                identity,
                commits: tally.commits,
                file_changes: tally.file_changes,
            })
            .collect();
        let edges: Vec<CoEditionEdge> = weights
            .into_iter()
            .map(|((source, target), weight)| CoEditionEdge {
                source,
                target,
                weight,
            })
            .collect();

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            "co-edition graph built"
        );

        let graph_hash = fingerprint_hex(&(&nodes, &edges));
        Self {
            nodes,
            edges,
            policy_hash: policy.params_hash(),
            graph_hash,
        }
    }

    /// Collaborators, ordered by identity.
    pub fn nodes(&self) -> &[CoEditionNode] {
        &self.nodes
    }

    /// Edges, ordered by (source, target).
    pub fn edges(&self) -> &[CoEditionEdge] {
        &self.edges
    }

    /// Number of collaborators.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct directed edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no collaborators.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node for an identity, if it appears in the graph.
    pub fn node(&self, identity: IdentityId) -> Option<&CoEditionNode> {
        self.nodes
            .binary_search_by_key(&identity, |node| node.identity)
            .ok()
            .map(|position| &self.nodes[position])
    }

    /// The weight of the edge from `source` to `target`, if present.
    pub fn edge_weight(&self, source: IdentityId, target: IdentityId) -> Option<u64> {
        self.edges
            .binary_search_by_key(&(source, target), |edge| (edge.source, edge.target))
            .ok()
            .map(|position| self.edges[position].weight)
    }

    /// All edges leaving `source`.
    pub fn edges_from(&self, source: IdentityId) -> impl Iterator<Item = &CoEditionEdge> {
        self.edges.iter().filter(move |edge| edge.source == source)
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> u64 {
        self.edges.iter().map(|edge| edge.weight).sum()
    }

    /// Hash of the policy parameters this graph was built under.
    pub fn policy_hash(&self) -> &str {
        &self.policy_hash
    }

    /// Deterministic hash of the graph content.
    pub fn graph_hash(&self) -> &str {
        &self.graph_hash
    }

    /// Collapse edge direction, summing opposing weights.
    ///
    /// The result keeps `source <= target` on every edge and measures
    /// collaboration intensity between pairs rather than who revised whom.
    pub fn symmetrized(&self) -> Self {
        let mut weights: BTreeMap<(IdentityId, IdentityId), u64> = BTreeMap::new();
        for edge in &self.edges {
            let key = if edge.source <= edge.target {
                (edge.source, edge.target)
            } else {
                (edge.target, edge.source)
            };
            *weights.entry(key).or_insert(0) += edge.weight;
        }
        let edges: Vec<CoEditionEdge> = weights
            .into_iter()
            .map(|((source, target), weight)| CoEditionEdge {
                source,
                target,
                weight,
            })
            .collect();
        let graph_hash = fingerprint_hex(&(&self.nodes, &edges));
        Self {
            nodes: self.nodes.clone(),
            edges,
            policy_hash: self.policy_hash.clone(),
            graph_hash,
        }
    }
}

fn add_edge(
    weights: &mut BTreeMap<(IdentityId, IdentityId), u64>,
    policy: &CoEditionPolicy,
    source: IdentityId,
    target: IdentityId,
) {
    if !policy.count_self_edges && source == target {
        return;
    }
    *weights.entry((source, target)).or_insert(0) += 1;
}

fn is_anonymous(identities: &IdentityTable, id: IdentityId) -> bool {
    identities
        .get(id)
        .map(|identity| identity.is_anonymous())
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommitRecord, FileChange};

    struct Fixture {
        store: CommitStore,
        identities: IdentityTable,
        dag: CommitDag,
        stats: RunStats,
    }

    fn make_fixture(records: Vec<CommitRecord>) -> Fixture {
        let mut stats = RunStats::new();
        let store = CommitStore::from_records(records, &mut stats);
        let identities = IdentityTable::resolve(&store);
        let dag = CommitDag::build(&store, &identities, &mut stats)
            .unwrap_or_else(|error| panic!("fixture history must be acyclic: {error}"));
        Fixture {
            store,
            identities,
            dag,
            stats,
        }
    }

    fn make_commit(sha: &str, login: &str, changes: Vec<FileChange>) -> CommitRecord {
        let mut record = CommitRecord::new(sha)
            .with_author(login, &format!("{login} Name"), &format!("{login}@example.com"));
        for change in changes {
            record = record.with_change(change);
        }
        record
    }

    fn added(path: &str) -> FileChange {
        FileChange::new(ChangeStatus::Added, path)
    }

    fn modified(path: &str) -> FileChange {
        FileChange::new(ChangeStatus::Modified, path)
    }

    fn removed(path: &str) -> FileChange {
        FileChange::new(ChangeStatus::Removed, path)
    }

    fn build(fixture: &mut Fixture, policy: &CoEditionPolicy) -> CoEditionGraph {
        let mut lineage = LineageResolver::new(&fixture.dag, &fixture.store);
        CoEditionGraph::build(
            &fixture.store,
            &fixture.dag,
            &fixture.identities,
            &mut lineage,
            policy,
            &mut fixture.stats,
        )
    }

    fn identity_of(fixture: &Fixture, login: &str) -> IdentityId {
        fixture
            .identities
            .identities()
            .iter()
            .find(|identity| identity.logins.contains(login))
            .map(|identity| identity.id)
            .unwrap_or_else(|| panic!("no identity for {login}"))
    }

    #[test]
    fn test_three_edits_make_one_edge_of_weight_three() {
        let mut fixture = make_fixture(vec![
            make_commit("base", "alice", vec![added("a.rs"), added("b.rs"), added("c.rs")]),
            make_commit(
                "edit",
                "bob",
                vec![modified("a.rs"), modified("b.rs"), modified("c.rs")],
            )
            .with_parent("base"),
        ]);
        let graph = build(&mut fixture, &CoEditionPolicy::default());

        let alice = identity_of(&fixture, "alice");
        let bob = identity_of(&fixture, "bob");
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_weight(alice, bob), Some(3));
        assert_eq!(graph.total_weight(), 3);
    }

    #[test]
    fn test_added_files_make_no_edges() {
        let mut fixture = make_fixture(vec![
            make_commit("base", "alice", vec![added("a.rs")]),
            make_commit("more", "bob", vec![added("fresh.rs")]).with_parent("base"),
        ]);
        let graph = build(&mut fixture, &CoEditionPolicy::default());

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 2);
        let bob = identity_of(&fixture, "bob");
        let node = graph.node(bob).unwrap();
        assert_eq!(node.commits, 1);
        assert_eq!(node.file_changes, 1);
    }

    #[test]
    fn test_committer_earns_a_parallel_edge() {
        let mut fixture = make_fixture(vec![
            make_commit("base", "alice", vec![added("a.rs")])
                .with_committer("carol", "Carol", "carol@example.com"),
            make_commit("edit", "bob", vec![modified("a.rs")]).with_parent("base"),
        ]);
        let graph = build(&mut fixture, &CoEditionPolicy::default());

        let alice = identity_of(&fixture, "alice");
        let bob = identity_of(&fixture, "bob");
        let carol = identity_of(&fixture, "carol");
        assert_eq!(graph.edge_weight(alice, bob), Some(1));
        assert_eq!(graph.edge_weight(carol, bob), Some(1));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_anonymous_committer_earns_nothing() {
        // No committer on the records at all, so the committer observation
        // resolves to an anonymous identity distinct from the author's.
        let mut fixture = make_fixture(vec![
            make_commit("base", "alice", vec![added("a.rs")]),
            make_commit("edit", "bob", vec![modified("a.rs")]).with_parent("base"),
        ]);
        let graph = build(&mut fixture, &CoEditionPolicy::default());

        let alice = identity_of(&fixture, "alice");
        let bob = identity_of(&fixture, "bob");
        assert_eq!(graph.edge_weight(alice, bob), Some(1));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_committer_credit_can_be_disabled() {
        let mut fixture = make_fixture(vec![
            make_commit("base", "alice", vec![added("a.rs")])
                .with_committer("carol", "Carol", "carol@example.com"),
            make_commit("edit", "bob", vec![modified("a.rs")]).with_parent("base"),
        ]);
        let mut policy = CoEditionPolicy::default();
        policy.credit_committer = false;
        let graph = build(&mut fixture, &policy);

        let alice = identity_of(&fixture, "alice");
        let bob = identity_of(&fixture, "bob");
        assert_eq!(graph.edge_weight(alice, bob), Some(1));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_self_edges_counted_by_default_and_suppressible() {
        let records = vec![
            make_commit("base", "alice", vec![added("a.rs")]),
            make_commit("fix", "alice", vec![modified("a.rs")]).with_parent("base"),
        ];

        let mut fixture = make_fixture(records.clone());
        let graph = build(&mut fixture, &CoEditionPolicy::default());
        let alice = identity_of(&fixture, "alice");
        assert_eq!(graph.edge_weight(alice, alice), Some(1));

        let mut fixture = make_fixture(records);
        let mut policy = CoEditionPolicy::default();
        policy.count_self_edges = false;
        let graph = build(&mut fixture, &policy);
        let alice = identity_of(&fixture, "alice");
        assert_eq!(graph.edge_weight(alice, alice), None);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_extension_filter_tallies_skipped_changes() {
        let mut fixture = make_fixture(vec![
            make_commit("base", "alice", vec![added("case.stl"), added("notes.md")]),
            make_commit(
                "edit",
                "bob",
                vec![modified("case.stl"), modified("notes.md"), modified("Makefile")],
            )
            .with_parent("base"),
        ]);
        let policy =
            CoEditionPolicy::default().with_filter(ExtensionFilter::hardware_certain());
        let graph = build(&mut fixture, &policy);

        let alice = identity_of(&fixture, "alice");
        let bob = identity_of(&fixture, "bob");
        assert_eq!(graph.edge_weight(alice, bob), Some(1));
        assert_eq!(fixture.stats.filtered_changes.get(".md"), Some(&2));
        assert_eq!(fixture.stats.filtered_changes.get(""), Some(&1));
        assert_eq!(fixture.stats.filtered_total(), 3);
    }

    #[test]
    fn test_modified_without_lineage_counts_an_anomaly() {
        let mut fixture = make_fixture(vec![
            make_commit("base", "alice", vec![added("a.rs")]),
            make_commit("edit", "bob", vec![modified("ghost.rs")]).with_parent("base"),
        ]);
        let graph = build(&mut fixture, &CoEditionPolicy::default());

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(fixture.stats.lineage_zero_results, 1);
    }

    #[test]
    fn test_removed_without_lineage_is_not_an_anomaly() {
        let mut fixture = make_fixture(vec![
            make_commit("base", "alice", vec![added("a.rs")]),
            make_commit("drop", "bob", vec![removed("ghost.rs")]).with_parent("base"),
        ]);
        build(&mut fixture, &CoEditionPolicy::default());

        assert_eq!(fixture.stats.lineage_zero_results, 0);
    }

    #[test]
    fn test_rename_links_to_the_old_name() {
        let mut fixture = make_fixture(vec![
            make_commit("base", "alice", vec![added("old.rs")]),
            make_commit("move", "bob", vec![FileChange::renamed("new.rs", "old.rs")])
                .with_parent("base"),
        ]);
        let graph = build(&mut fixture, &CoEditionPolicy::default());

        let alice = identity_of(&fixture, "alice");
        let bob = identity_of(&fixture, "bob");
        assert_eq!(graph.edge_weight(alice, bob), Some(1));
        assert_eq!(fixture.stats.lineage_zero_results, 0);
    }

    #[test]
    fn test_symmetrized_merges_opposing_edges() {
        let mut fixture = make_fixture(vec![
            make_commit("base", "alice", vec![added("a.rs")]),
            make_commit("edit", "bob", vec![modified("a.rs")]).with_parent("base"),
            make_commit("back", "alice", vec![modified("a.rs")]).with_parent("edit"),
        ]);
        let graph = build(&mut fixture, &CoEditionPolicy::default());
        let undirected = graph.symmetrized();

        let alice = identity_of(&fixture, "alice");
        let bob = identity_of(&fixture, "bob");
        assert_eq!(graph.edge_weight(alice, bob), Some(1));
        assert_eq!(graph.edge_weight(bob, alice), Some(1));
        assert_eq!(undirected.edge_count(), 1);
        assert_eq!(undirected.total_weight(), 2);
        assert_ne!(graph.graph_hash(), undirected.graph_hash());
    }

    #[test]
    fn test_graph_hash_is_stable() {
        let records = vec![
            make_commit("base", "alice", vec![added("a.rs")]),
            make_commit("edit", "bob", vec![modified("a.rs")]).with_parent("base"),
        ];
        let mut first = make_fixture(records.clone());
        let mut second = make_fixture(records);
        let graph_a = build(&mut first, &CoEditionPolicy::default());
        let graph_b = build(&mut second, &CoEditionPolicy::default());

        assert_eq!(graph_a.graph_hash(), graph_b.graph_hash());
        assert_eq!(graph_a.policy_hash(), graph_b.policy_hash());
    }
}
