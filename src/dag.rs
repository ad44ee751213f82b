//! Commit ancestry DAG.
//!
//! One node per validated record, one directed edge per resolvable
//! (parent → child) reference. Parent references with no matching node are
//! expected at history-fetch truncation boundaries; they are counted, not
//! fatal. A parent cycle is fatal: acyclicity underpins lineage and
//! co-edition, so the builder rejects the whole project rather than emit a
//! partial graph.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::IdentityTable;
use crate::store::CommitStore;
use crate::types::{CommitNode, RunStats};

/// Dense handle to one node of a [`CommitDag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    fn new(raw: usize) -> Self {
        Self(raw as u32)
    }

    /// Position in the dense node tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for DAG construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DagError {
    /// The parent references close a cycle; participants in walk order.
    #[error("commit ancestry is cyclic: {}", .participants.join(" -> "))]
    AncestryCycle {
        /// Identifiers of the commits on the detected cycle.
        participants: Vec<String>,
    },
}

/// The commit ancestry graph for one project run.
///
/// Node order matches store order, so [`NodeId`]s double as dense table
/// indices for the downstream stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDag {
    nodes: Vec<CommitNode>,
    index: HashMap<String, NodeId>,
    parents: Vec<Vec<NodeId>>,
    children: Vec<Vec<NodeId>>,
    edges: Vec<(NodeId, NodeId)>,
}

impl CommitDag {
    /// Build the ancestry graph over a validated store.
    ///
    /// ## Algorithm
    ///
    /// 1. One node per store record, in store order, with author/committer
    ///    resolved through the identity table
    /// 2. One edge per parent reference that resolves against the complete
    ///    node set (forward references connect too); unresolvable references
    ///    count as dangling
    /// 3. Kahn ordering pass over the finished adjacency; any node left
    ///    unordered proves a cycle, which fails the build
    pub fn build(
        store: &CommitStore,
        identities: &IdentityTable,
        stats: &mut RunStats,
    ) -> Result<Self, DagError> {
        let mut nodes: Vec<CommitNode> = Vec::with_capacity(store.len());
        let mut index: HashMap<String, NodeId> = HashMap::with_capacity(store.len());

        for (record, (&author, &committer)) in store
            .iter()
            .zip(identities.authors().iter().zip(identities.committers().iter()))
        {
            let Some(sha) = record.sha.clone() else {
                continue;
            };
            index.insert(sha.clone(), NodeId::new(nodes.len()));
            nodes.push(CommitNode {
                short_sha: CommitNode::short(&sha),
                sha,
                author,
                committer,
                message: record.message().to_string(),
                authored_at: record.authored_at(),
                committed_at: record.committed_at(),
                url: record.url.clone().unwrap_or_default(),
                affected_files: record.files.as_ref().map(|files| files.len() as u32),
            });
        }

        let mut parents: Vec<Vec<NodeId>> = vec![Vec::new(); nodes.len()];
        let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); nodes.len()];
        let mut edges: Vec<(NodeId, NodeId)> = Vec::new();

        for record in store.iter() {
            let child = record
                .sha
                .as_deref()
                .and_then(|sha| index.get(sha).copied());
            let Some(child) = child else {
                continue;
            };
            for parent_ref in &record.parents {
                match parent_ref
                    .sha
                    .as_deref()
                    .and_then(|sha| index.get(sha).copied())
                {
                    Some(parent) => {
                        parents[child.index()].push(parent);
                        children[parent.index()].push(child);
                        edges.push((parent, child));
                    }
                    None => {
                        stats.dangling_parents += 1;
                        tracing::warn!(
                            child = %nodes[child.index()].short_sha,
                            parent = parent_ref.sha.as_deref().unwrap_or("<missing>"),
                            "parent reference resolves to no known commit"
                        );
                    }
                }
            }
        }

        let dag = Self {
            nodes,
            index,
            parents,
            children,
            edges,
        };
        if let Some(participants) = dag.find_cycle() {
            return Err(DagError::AncestryCycle { participants });
        }
        Ok(dag)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, in store order.
    pub fn nodes(&self) -> &[CommitNode] {
        &self.nodes
    }

    /// The node behind a handle minted by this graph.
    pub fn node(&self, id: NodeId) -> &CommitNode {
        &self.nodes[id.index()]
    }

    /// Iterate the node handles in store order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Look up a node handle by commit identifier.
    pub fn node_id(&self, sha: &str) -> Option<NodeId> {
        self.index.get(sha).copied()
    }

    /// Look up a node by commit identifier.
    pub fn get(&self, sha: &str) -> Option<&CommitNode> {
        self.node_id(sha).map(|id| self.node(id))
    }

    /// Parent handles of a node.
    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        &self.parents[id.index()]
    }

    /// Child handles of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.children[id.index()]
    }

    /// All (parent → child) edges, in discovery order.
    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Kahn ordering pass; on failure, extract one concrete cycle.
    fn find_cycle(&self) -> Option<Vec<String>> {
        let n = self.nodes.len();
        let mut indegree: Vec<usize> = self.parents.iter().map(|p| p.len()).collect();
        let mut queue: VecDeque<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();

        let mut ordered = 0usize;
        while let Some(node) = queue.pop_front() {
            ordered += 1;
            for &child in &self.children[node] {
                indegree[child.index()] -= 1;
                if indegree[child.index()] == 0 {
                    queue.push_back(child.index());
                }
            }
        }
        if ordered == n {
            return None;
        }

        // Whatever Kahn could not order sits on a cycle or downstream of
        // one; a depth-first walk restricted to that remainder must close a
        // grey-on-grey edge somewhere.
        let remaining: Vec<bool> = indegree.iter().map(|&d| d > 0).collect();
        Some(self.extract_cycle(&remaining))
    }

    fn extract_cycle(&self, remaining: &[bool]) -> Vec<String> {
        const WHITE: u8 = 0;
        const GREY: u8 = 1;
        const BLACK: u8 = 2;

        let mut color = vec![WHITE; self.nodes.len()];
        let mut path: Vec<usize> = Vec::new();
        let mut path_pos: Vec<Option<usize>> = vec![None; self.nodes.len()];

        for start in 0..self.nodes.len() {
            if !remaining[start] || color[start] != WHITE {
                continue;
            }

            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            color[start] = GREY;
            path_pos[start] = Some(path.len());
            path.push(start);

            while let Some(&mut (node, ref mut next_child)) = stack.last_mut() {
                let child_list = &self.children[node];
                if *next_child < child_list.len() {
                    let child = child_list[*next_child].index();
                    *next_child += 1;
                    if !remaining[child] {
                        continue;
                    }
                    match color[child] {
                        WHITE => {
                            color[child] = GREY;
                            path_pos[child] = Some(path.len());
                            path.push(child);
                            stack.push((child, 0));
                        }
                        GREY => {
                            if let Some(from) = path_pos[child] {
                                return path[from..]
                                    .iter()
                                    .map(|&i| self.nodes[i].sha.clone())
                                    .collect();
                            }
                        }
                        _ => {}
                    }
                } else {
                    color[node] = BLACK;
                    path_pos[node] = None;
                    path.pop();
                    stack.pop();
                }
            }
        }

        Vec::new()
    }
}
