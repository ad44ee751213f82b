//! Batch analysis across many projects.
//!
//! Projects share nothing, so the runner fans them out over a thread pool
//! and collects results in input order. A project whose ancestry is cyclic
//! fails alone; the rest of the batch proceeds.

use rayon::prelude::*;

use crate::coedition::CoEditionPolicy;
use crate::pipeline::{analyze_project, AnalysisError, ProjectAnalysis};
use crate::types::{CommitRecord, RunStats};

/// One project's name and raw records.
#[derive(Debug, Clone)]
pub struct ProjectInput {
    /// Project name.
    pub name: String,
    /// Per-commit records.
    pub records: Vec<CommitRecord>,
}

impl ProjectInput {
    /// Create a batch input.
    pub fn new(name: impl Into<String>, records: Vec<CommitRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// A project whose analysis aborted.
#[derive(Debug)]
pub struct ProjectFailure {
    /// Project name.
    pub project: String,
    /// Why the analysis aborted.
    pub error: AnalysisError,
}

/// Results of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Successful analyses, in input order.
    pub analyses: Vec<ProjectAnalysis>,
    /// Failed projects, in input order.
    pub failures: Vec<ProjectFailure>,
    /// Counters merged across all successful analyses.
    pub totals: RunStats,
}

impl BatchReport {
    /// Names of analyzed projects whose store ended up empty.
    pub fn empty_projects(&self) -> Vec<&str> {
        self.analyses
            .iter()
            .filter(|analysis| analysis.store.is_empty())
            .map(|analysis| analysis.project.as_str())
            .collect()
    }
}

/// Runs many project analyses under one policy.
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    policy: CoEditionPolicy,
}

impl BatchRunner {
    /// Create a runner with the given policy.
    pub fn new(policy: CoEditionPolicy) -> Self {
        Self { policy }
    }

    /// The policy applied to every project.
    pub fn policy(&self) -> &CoEditionPolicy {
        &self.policy
    }

    /// Analyze every project, in parallel.
    pub fn run(&self, inputs: Vec<ProjectInput>) -> BatchReport {
        let results: Vec<Result<ProjectAnalysis, ProjectFailure>> = inputs
            .into_par_iter()
            .map(|input| {
                analyze_project(input.name.clone(), input.records, &self.policy).map_err(
                    |error| {
                        tracing::warn!(project = %input.name, %error, "project analysis failed");
                        ProjectFailure {
                            project: input.name,
                            error,
                        }
                    },
                )
            })
            .collect();

        let mut analyses = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(analysis) => analyses.push(analysis),
                Err(failure) => failures.push(failure),
            }
        }

        let mut totals = RunStats::new();
        for analysis in &analyses {
            totals.merge(&analysis.stats);
        }

        tracing::debug!(
            analyzed = analyses.len(),
            failed = failures.len(),
            "batch complete"
        );

        BatchReport {
            analyses,
            failures,
            totals,
        }
    }
}
