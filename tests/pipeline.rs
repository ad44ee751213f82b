//! Golden tests for forgegraph.
//!
//! These tests verify determinism and correctness of the derived graphs
//! end to end, from raw records through the analysis pipeline.

use forgegraph::{
    analyze_project, coedition_graphml, commit_dag_graphml, file_lineage_graphml,
    AnalysisError, BatchRunner, ChangeStatus, CoEditionPolicy, CommitRecord, DagError,
    ExtensionFilter, FileChange, IdentityId, ProjectAnalysis, ProjectInput,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Surface anomaly logs during test runs when RUST_LOG is set.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn commit(sha: &str, login: &str, parents: &[&str], files: &[FileChange]) -> CommitRecord {
    let name = format!("{login} Dev");
    let email = format!("{login}@example.com");
    let mut record = CommitRecord::new(sha)
        .with_author(login, &name, &email)
        .with_committer(login, &name, &email)
        .with_message(format!("work on {sha}"));
    for parent in parents {
        record = record.with_parent(*parent);
    }
    for file in files {
        record = record.with_change(file.clone());
    }
    record
}

fn added(path: &str) -> FileChange {
    FileChange::new(ChangeStatus::Added, path)
}

fn modified(path: &str) -> FileChange {
    FileChange::new(ChangeStatus::Modified, path)
}

/// A small workshop history with a merge and a rename.
///
///   base ── plate ──── merge ── rename ── final
///      \              /
///       └── sensor ──┘
fn build_workshop_history() -> Vec<CommitRecord> {
    vec![
        commit(
            "base",
            "alice",
            &[],
            &[added("cad/bracket.stl"), added("ecad/board.sch"), added("README.md")],
        ),
        commit(
            "plate",
            "bob",
            &["base"],
            &[modified("cad/bracket.stl"), added("cad/plate.stl")],
        ),
        commit("sensor", "carol", &["base"], &[modified("ecad/board.sch")]),
        commit(
            "merge",
            "alice",
            &["plate", "sensor"],
            &[modified("cad/bracket.stl"), modified("ecad/board.sch")],
        ),
        commit(
            "rename",
            "dana",
            &["merge"],
            &[FileChange::renamed("cad/arm.stl", "cad/bracket.stl")],
        ),
        commit("final", "bob", &["rename"], &[modified("cad/arm.stl")]),
    ]
}

fn analyze(records: Vec<CommitRecord>, policy: &CoEditionPolicy) -> ProjectAnalysis {
    init_tracing();
    analyze_project("workshop", records, policy).unwrap()
}

fn identity_of(analysis: &ProjectAnalysis, login: &str) -> IdentityId {
    analysis
        .identities
        .identities()
        .iter()
        .find(|identity| identity.logins.contains(login))
        .map(|identity| identity.id)
        .unwrap_or_else(|| panic!("no identity for {login}"))
}

// ─────────────────────────────────────────────────────────────────────────────
// END-TO-END CORRECTNESS
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_workshop_history_end_to_end() {
    let analysis = analyze(build_workshop_history(), &CoEditionPolicy::default());

    // Six commits, one parent edge per parent reference.
    assert_eq!(analysis.store.len(), 6);
    assert_eq!(analysis.dag.len(), 6);
    assert_eq!(analysis.dag.edge_count(), 6);

    // Four people, each observed as author and committer of the same triple.
    assert_eq!(analysis.identities.len(), 4);

    let alice = identity_of(&analysis, "alice");
    let bob = identity_of(&analysis, "bob");
    let carol = identity_of(&analysis, "carol");
    let dana = identity_of(&analysis, "dana");

    // bob's plate edit and carol's sensor edit both revise alice's base.
    assert_eq!(analysis.coedition.edge_weight(alice, bob), Some(1));
    assert_eq!(analysis.coedition.edge_weight(alice, carol), Some(1));
    // The merge revises bob's branch, carol's branch, and alice's own base
    // files; the self-edge accumulates once per file.
    assert_eq!(analysis.coedition.edge_weight(bob, alice), Some(1));
    assert_eq!(analysis.coedition.edge_weight(carol, alice), Some(1));
    assert_eq!(analysis.coedition.edge_weight(alice, alice), Some(2));
    // The rename revises the merge, and the final edit revises the rename.
    assert_eq!(analysis.coedition.edge_weight(alice, dana), Some(1));
    assert_eq!(analysis.coedition.edge_weight(dana, bob), Some(1));

    assert_eq!(analysis.coedition.edge_count(), 7);
    assert_eq!(analysis.coedition.total_weight(), 8);
    assert_eq!(analysis.coedition.node_count(), 4);

    // One event per counted change, one lineage edge per nearest ancestor.
    assert_eq!(analysis.file_lineage.event_count(), 10);
    assert_eq!(analysis.file_lineage.edge_count(), 8);

    assert!(!analysis.stats.has_anomalies());
}

#[test]
fn test_identities_merge_across_observation_variants() {
    // The same person appears with a re-cased login and a new email, and a
    // colleague is only ever known by name and email.
    let records = vec![
        CommitRecord::new("a")
            .with_author("xdev", "Xan Doe", "xan@example.com")
            .with_committer("xdev", "Xan Doe", "xan@example.com")
            .with_change(added("f.txt")),
        CommitRecord::new("b")
            .with_author("", "Yuri Ko", "yuri@example.com")
            .with_committer("", "Yuri Ko", "yuri@example.com")
            .with_parent("a")
            .with_change(modified("f.txt")),
        CommitRecord::new("c")
            .with_author("XDEV", "", "xan@acme.example")
            .with_committer("XDEV", "", "xan@acme.example")
            .with_parent("b")
            .with_change(modified("f.txt")),
    ];
    let analysis = analyze(records, &CoEditionPolicy::default());

    assert_eq!(analysis.identities.len(), 2);
    let xan = identity_of(&analysis, "xdev");
    let xan_identity = analysis.identities.get(xan).unwrap();
    assert!(xan_identity.emails.contains("xan@example.com"));
    assert!(xan_identity.emails.contains("xan@acme.example"));

    let yuri = analysis
        .identities
        .identities()
        .iter()
        .find(|identity| identity.names.contains("Yuri Ko"))
        .map(|identity| identity.id)
        .unwrap();

    // Yuri revised Xan's file and Xan revised Yuri's revision; the final
    // edit never reaches back past its nearest ancestor.
    assert_eq!(analysis.coedition.edge_weight(xan, yuri), Some(1));
    assert_eq!(analysis.coedition.edge_weight(yuri, xan), Some(1));
    assert_eq!(analysis.coedition.edge_weight(xan, xan), None);
}

#[test]
fn test_damaged_records_degrade_without_aborting() {
    let mut records = build_workshop_history();
    // A duplicate of an existing commit, a record with no sha at all, and
    // a parent reference nothing resolves.
    records.push(commit("base", "alice", &[], &[added("cad/bracket.stl")]));
    records.push(CommitRecord::new("").with_author("ghost", "Ghost", "ghost@example.com"));
    records.push(commit("stray", "bob", &["vanished"], &[modified("README.md")]));

    let analysis = analyze(records, &CoEditionPolicy::default());

    assert_eq!(analysis.stats.total_records, 9);
    assert_eq!(analysis.stats.duplicate_records, 1);
    assert_eq!(analysis.stats.malformed_records, 1);
    assert_eq!(analysis.stats.dangling_parents, 1);
    assert!(analysis.stats.has_anomalies());

    // The stray commit still made it into the DAG as a root.
    assert_eq!(analysis.dag.len(), 7);
    assert_eq!(analysis.dag.edge_count(), 6);
}

#[test]
fn test_cyclic_ancestry_is_fatal() {
    let records = vec![
        commit("a", "alice", &["c"], &[added("f.txt")]),
        commit("b", "bob", &["a"], &[modified("f.txt")]),
        commit("c", "carol", &["b"], &[modified("f.txt")]),
    ];
    let error = analyze_project("ouroboros", records, &CoEditionPolicy::default())
        .unwrap_err();

    let AnalysisError::Dag(DagError::AncestryCycle { participants }) = error else {
        panic!("expected an ancestry cycle");
    };
    assert_eq!(participants.len(), 3);
    assert!(participants.contains(&"a".to_string()));
}

#[test]
fn test_extension_filter_narrows_both_graphs() {
    let policy = CoEditionPolicy::default().with_filter(ExtensionFilter::hardware_certain());
    let analysis = analyze(build_workshop_history(), &policy);

    // README.md is the only change outside the CAD catalogs.
    assert_eq!(analysis.stats.filtered_changes.get(".md"), Some(&1));
    assert_eq!(analysis.stats.filtered_total(), 1);
    assert_eq!(analysis.file_lineage.event_count(), 9);
    assert!(analysis
        .file_lineage
        .events()
        .iter()
        .all(|event| !event.path.ends_with(".md")));
}

// ─────────────────────────────────────────────────────────────────────────────
// DETERMINISM TESTS
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_same_records_same_hashes_100_runs() {
    let mut coedition_hashes: Vec<String> = Vec::with_capacity(100);
    let mut lineage_hashes: Vec<String> = Vec::with_capacity(100);

    for _ in 0..100 {
        let analysis = analyze(build_workshop_history(), &CoEditionPolicy::default());
        coedition_hashes.push(analysis.coedition.graph_hash().to_string());
        lineage_hashes.push(analysis.file_lineage.graph_hash().to_string());
    }

    for i in 1..100 {
        assert_eq!(
            coedition_hashes[0], coedition_hashes[i],
            "co-edition hash must be deterministic (run {} differs from run 0)",
            i
        );
        assert_eq!(
            lineage_hashes[0], lineage_hashes[i],
            "file lineage hash must be deterministic (run {} differs from run 0)",
            i
        );
    }

    eprintln!("Deterministic co-edition hash: {}", coedition_hashes[0]);
}

#[test]
fn test_policy_param_change_changes_the_hash() {
    let default_policy = CoEditionPolicy::default();
    let mut solo_free = CoEditionPolicy::default();
    solo_free.count_self_edges = false;

    let with_self = analyze(build_workshop_history(), &default_policy);
    let without_self = analyze(build_workshop_history(), &solo_free);

    assert_ne!(
        with_self.coedition.policy_hash(),
        without_self.coedition.policy_hash()
    );
    assert_ne!(
        with_self.coedition.graph_hash(),
        without_self.coedition.graph_hash()
    );
    assert_eq!(without_self.coedition.total_weight(), 6);

    // The file lineage graph does not depend on edge policy.
    assert_eq!(
        with_self.file_lineage.graph_hash(),
        without_self.file_lineage.graph_hash()
    );
}

#[test]
fn test_manifest_is_reproducible() {
    let first = analyze(build_workshop_history(), &CoEditionPolicy::default());
    let second = analyze(build_workshop_history(), &CoEditionPolicy::default());
    assert_eq!(first.manifest(), second.manifest());
}

// ─────────────────────────────────────────────────────────────────────────────
// EXPORT AND BATCH
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_graphml_documents_cover_every_node() {
    let analysis = analyze(build_workshop_history(), &CoEditionPolicy::default());

    let dag_doc = commit_dag_graphml(&analysis.dag, &analysis.store);
    assert_eq!(dag_doc.matches("<node id=").count(), 6);
    assert_eq!(dag_doc.matches("<edge source=").count(), 6);
    assert!(dag_doc.contains("<node id=\"merge\">"));

    let coedition_doc = coedition_graphml(&analysis.coedition, &analysis.identities);
    assert_eq!(coedition_doc.matches("<node id=").count(), 4);
    assert_eq!(coedition_doc.matches("<edge source=").count(), 7);
    assert!(coedition_doc.contains("<data key=\"author\">alice</data>"));

    let lineage_doc = file_lineage_graphml(&analysis.file_lineage, &analysis.identities);
    assert_eq!(lineage_doc.matches("<node id=").count(), 10);
    assert_eq!(lineage_doc.matches("<edge source=").count(), 8);
}

#[test]
fn test_batch_run_spans_good_and_broken_projects() {
    let runner = BatchRunner::new(CoEditionPolicy::default());
    let report = runner.run(vec![
        ProjectInput::new("workshop", build_workshop_history()),
        ProjectInput::new(
            "ouroboros",
            vec![
                CommitRecord::new("a").with_parent("b"),
                CommitRecord::new("b").with_parent("a"),
            ],
        ),
    ]);

    assert_eq!(report.analyses.len(), 1);
    assert_eq!(report.analyses[0].project, "workshop");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].project, "ouroboros");
    assert_eq!(report.totals.total_records, 6);
}
