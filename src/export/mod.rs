//! Exporters for the derived graphs.
//!
//! GraphML is the only format here; it round-trips through the usual graph
//! tooling and keeps attribute names stable across runs.

mod graphml;

pub use graphml::{coedition_graphml, commit_dag_graphml, file_lineage_graphml};
