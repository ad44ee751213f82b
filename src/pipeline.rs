//! End-to-end analysis of a single project's commit history.
//!
//! The stages run in dependency order: records are deduplicated into a
//! store, identities are resolved over it, the ancestry DAG is built and
//! validated, and both derived graphs are computed over one shared lineage
//! resolver so ancestry walks are paid for once.
//!
//! A cyclic ancestry graph aborts the whole analysis. Everything else
//! degrades: damaged records are dropped and counted, missing fields leave
//! gaps, and the counters travel with the result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coedition::{CoEditionGraph, CoEditionPolicy};
use crate::dag::{CommitDag, DagError};
use crate::filegraph::FileLineageGraph;
use crate::identity::IdentityTable;
use crate::ingest::{self, IngestError};
use crate::lineage::LineageResolver;
use crate::store::CommitStore;
use crate::types::{CommitRecord, RunStats};
use crate::FORGEGRAPH_SCHEMA_VERSION;

/// Errors that abort an analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The ancestry graph is structurally unusable.
    #[error(transparent)]
    Dag(#[from] DagError),
    /// The raw payload could not be parsed.
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Everything derived from one project's history.
#[derive(Debug, Clone)]
pub struct ProjectAnalysis {
    /// Project name, as given by the caller.
    pub project: String,
    /// The deduplicated commit records.
    pub store: CommitStore,
    /// Resolved collaborator identities.
    pub identities: IdentityTable,
    /// The commit ancestry DAG.
    pub dag: CommitDag,
    /// The co-edition graph.
    pub coedition: CoEditionGraph,
    /// The file lineage graph.
    pub file_lineage: FileLineageGraph,
    /// Anomaly counters accumulated across all stages.
    pub stats: RunStats,
}

/// Compact serializable summary of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisManifest {
    /// Project name.
    pub project: String,
    /// Schema version of this manifest.
    pub schema_version: String,
    /// Commits kept in the store.
    pub commits: usize,
    /// Parent edges in the ancestry DAG.
    pub dag_edges: usize,
    /// Distinct collaborator identities.
    pub identities: usize,
    /// Collaborators in the co-edition graph.
    pub coedition_nodes: usize,
    /// Directed edges in the co-edition graph.
    pub coedition_edges: usize,
    /// Change events in the file lineage graph.
    pub file_events: usize,
    /// Hash of the policy parameters.
    pub policy_hash: String,
    /// Hash of the co-edition graph content.
    pub coedition_hash: String,
    /// Hash of the file lineage graph content.
    pub file_lineage_hash: String,
    /// Anomaly counters for the run.
    pub stats: RunStats,
}

impl ProjectAnalysis {
    /// Summarize this analysis for storage or comparison.
    pub fn manifest(&self) -> AnalysisManifest {
        AnalysisManifest {
            project: self.project.clone(),
            schema_version: FORGEGRAPH_SCHEMA_VERSION.to_string(),
            commits: self.store.len(),
            dag_edges: self.dag.edge_count(),
            identities: self.identities.len(),
            coedition_nodes: self.coedition.node_count(),
            coedition_edges: self.coedition.edge_count(),
            file_events: self.file_lineage.event_count(),
            policy_hash: self.coedition.policy_hash().to_string(),
            coedition_hash: self.coedition.graph_hash().to_string(),
            file_lineage_hash: self.file_lineage.graph_hash().to_string(),
            stats: self.stats.clone(),
        }
    }
}

/// Analyze one project from already-parsed records.
pub fn analyze_project(
    project: impl Into<String>,
    records: Vec<CommitRecord>,
    policy: &CoEditionPolicy,
) -> Result<ProjectAnalysis, AnalysisError> {
    let project = project.into();
    let mut stats = RunStats::new();

    let store = CommitStore::from_records(records, &mut stats);
    let identities = IdentityTable::resolve(&store);
    let dag = CommitDag::build(&store, &identities, &mut stats)?;

    let mut lineage = LineageResolver::new(&dag, &store);
    let coedition = CoEditionGraph::build(
        &store,
        &dag,
        &identities,
        &mut lineage,
        policy,
        &mut stats,
    );
    let file_lineage = FileLineageGraph::build(
        &store,
        &dag,
        &mut lineage,
        policy.extension_filter.as_ref(),
    );

    tracing::debug!(
        project = %project,
        commits = store.len(),
        identities = identities.len(),
        "project analyzed"
    );

    Ok(ProjectAnalysis {
        project,
        store,
        identities,
        dag,
        coedition,
        file_lineage,
        stats,
    })
}

/// Analyze one project from a raw JSON payload.
pub fn analyze_json(
    project: impl Into<String>,
    payload: &str,
    policy: &CoEditionPolicy,
) -> Result<ProjectAnalysis, AnalysisError> {
    let records = ingest::parse_records(payload)?;
    analyze_project(project, records, policy)
}
