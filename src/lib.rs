//! # forgegraph
//!
//! Deterministic collaboration analytics over forge commit histories.
//!
//! Forgegraph answers one question:
//!
//! > Given a project's commit records, **who builds on whose work**?
//!
//! ## Core Contract
//!
//! 1. Ingest per-commit API records and validate the ancestry DAG (a cycle is fatal)
//! 2. Resolve collaborator identities by transitive closure over logins, names, and emails
//! 3. Derive the co-edition graph and the file lineage graph, each with a stable fingerprint
//!
//! ## Architecture
//!
//! ```text
//! CommitRecord → CommitStore → IdentityTable → CommitDag
//!                                                  ↓
//!                   CoEditionGraph ← LineageResolver → FileLineageGraph
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same records + same policy → identical graph hashes
//! - Identity numbering follows first appearance in record order
//! - Node and edge orderings are canonical everywhere a graph is exported

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod ingest;
pub mod store;
pub mod identity;
pub mod dag;
pub mod lineage;
pub mod coedition;
pub mod filegraph;
pub mod export;
pub mod pipeline;
pub mod batch;
pub mod fingerprint;

// Re-exports
pub use types::{
    ActorRef, ChangeStatus, CommitDetail, CommitNode, CommitRecord, FileChange, Identity,
    IdentityId, Observation, ParentRef, RunStats, Signature,
};
pub use ingest::{parse_record, parse_records, IngestError};
pub use store::CommitStore;
pub use identity::IdentityTable;
pub use dag::{CommitDag, DagError, NodeId};
pub use lineage::{basename, LineageResolver};
pub use coedition::{
    CoEditionEdge, CoEditionGraph, CoEditionNode, CoEditionPolicy, ExtensionFilter,
};
pub use filegraph::{FileEvent, FileLineageGraph};
pub use export::{coedition_graphml, commit_dag_graphml, file_lineage_graphml};
pub use pipeline::{
    analyze_json, analyze_project, AnalysisError, AnalysisManifest, ProjectAnalysis,
};
pub use batch::{BatchReport, BatchRunner, ProjectFailure, ProjectInput};
pub use fingerprint::{fingerprint_bytes, fingerprint_hex, fingerprint_u64};

/// Schema version for all serialized artifacts.
/// Increment on breaking changes to any exported type.
pub const FORGEGRAPH_SCHEMA_VERSION: &str = "1.0.0";

/// Default policy version identifier.
pub const DEFAULT_POLICY_VERSION: &str = "coedition_policy_v1";
