//! GraphML serialization of the commit DAG, the co-edition graph, and the
//! file lineage graph.
//!
//! Attribute keys reuse the attribute name as the key id, so the documents
//! stay readable without a lookup table. Absent values omit their `<data>`
//! element rather than writing an empty one.

use chrono::SecondsFormat;

use crate::coedition::CoEditionGraph;
use crate::dag::CommitDag;
use crate::filegraph::FileLineageGraph;
use crate::identity::IdentityTable;
use crate::store::CommitStore;
use crate::types::IdentityId;

const HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n",
);

fn xml_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for character in raw.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn push_key(out: &mut String, target: &str, name: &str, kind: &str) {
    out.push_str(&format!(
        "  <key id=\"{name}\" for=\"{target}\" attr.name=\"{name}\" attr.type=\"{kind}\"/>\n"
    ));
}

fn push_data(out: &mut String, key: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    out.push_str(&format!(
        "      <data key=\"{key}\">{}</data>\n",
        xml_escape(value)
    ));
}

fn identity_label(identities: &IdentityTable, id: IdentityId) -> String {
    identities
        .get(id)
        .map(|identity| identity.label())
        .unwrap_or_else(|| id.to_string())
}

/// Serialize the commit ancestry DAG.
///
/// Nodes are keyed by full sha and carry the raw signature fields from the
/// record, with original casing. Edges point from parent to child.
pub fn commit_dag_graphml(dag: &CommitDag, store: &CommitStore) -> String {
    let mut out = String::from(HEADER);
    for name in [
        "shortSha",
        "authorName",
        "authorEmail",
        "authorLogin",
        "authoredDate",
        "committerName",
        "committerEmail",
        "committerLogin",
        "committedDate",
        "message",
        "url",
    ] {
        push_key(&mut out, "node", name, "string");
    }
    push_key(&mut out, "node", "affectedFiles", "long");
    out.push_str("  <graph edgedefault=\"directed\">\n");

    for id in dag.node_ids() {
        let node = dag.node(id);
        out.push_str(&format!("    <node id=\"{}\">\n", xml_escape(&node.sha)));
        push_data(&mut out, "shortSha", &node.short_sha);
        if let Some(record) = store.get(&node.sha) {
            let author = record.author_observation();
            push_data(&mut out, "authorName", &author.name);
            push_data(&mut out, "authorEmail", &author.email);
            push_data(&mut out, "authorLogin", &author.login);
            let committer = record.committer_observation();
            push_data(&mut out, "committerName", &committer.name);
            push_data(&mut out, "committerEmail", &committer.email);
            push_data(&mut out, "committerLogin", &committer.login);
        }
        if let Some(date) = node.authored_at {
            push_data(
                &mut out,
                "authoredDate",
                &date.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        }
        if let Some(date) = node.committed_at {
            push_data(
                &mut out,
                "committedDate",
                &date.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        }
        push_data(&mut out, "message", &node.message);
        push_data(&mut out, "url", &node.url);
        if let Some(count) = node.affected_files {
            push_data(&mut out, "affectedFiles", &count.to_string());
        }
        out.push_str("    </node>\n");
    }
    for (parent, child) in dag.edges() {
        out.push_str(&format!(
            "    <edge source=\"{}\" target=\"{}\"/>\n",
            xml_escape(&dag.node(*parent).sha),
            xml_escape(&dag.node(*child).sha),
        ));
    }

    out.push_str("  </graph>\n</graphml>\n");
    out
}

/// Serialize the co-edition graph.
///
/// Nodes are keyed `i<identity>` and labelled with the identity's display
/// label. Edge weight rides along as edge data.
pub fn coedition_graphml(graph: &CoEditionGraph, identities: &IdentityTable) -> String {
    let mut out = String::from(HEADER);
    push_key(&mut out, "node", "author", "string");
    push_key(&mut out, "node", "commits", "long");
    push_key(&mut out, "node", "filechanges", "long");
    push_key(&mut out, "edge", "weight", "long");
    out.push_str("  <graph edgedefault=\"directed\">\n");

    for node in graph.nodes() {
        out.push_str(&format!("    <node id=\"i{}\">\n", node.identity.index()));
        push_data(&mut out, "author", &identity_label(identities, node.identity));
        push_data(&mut out, "commits", &node.commits.to_string());
        push_data(&mut out, "filechanges", &node.file_changes.to_string());
        out.push_str("    </node>\n");
    }
    for edge in graph.edges() {
        out.push_str(&format!(
            "    <edge source=\"i{}\" target=\"i{}\">\n",
            edge.source.index(),
            edge.target.index(),
        ));
        push_data(&mut out, "weight", &edge.weight.to_string());
        out.push_str("    </edge>\n");
    }

    out.push_str("  </graph>\n</graphml>\n");
    out
}

/// Serialize the file lineage graph.
///
/// Nodes are keyed `e<index>` in event order. Edges point from an earlier
/// change event to the event that revised it.
pub fn file_lineage_graphml(graph: &FileLineageGraph, identities: &IdentityTable) -> String {
    let mut out = String::from(HEADER);
    for name in ["sha", "filename", "status", "date", "author"] {
        push_key(&mut out, "node", name, "string");
    }
    out.push_str("  <graph edgedefault=\"directed\">\n");

    for (index, event) in graph.events().iter().enumerate() {
        out.push_str(&format!("    <node id=\"e{index}\">\n"));
        push_data(&mut out, "sha", &event.sha);
        push_data(&mut out, "filename", &event.path);
        push_data(&mut out, "status", &event.status.to_string());
        if let Some(date) = event.occurred_at {
            push_data(
                &mut out,
                "date",
                &date.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        }
        push_data(&mut out, "author", &identity_label(identities, event.author));
        out.push_str("    </node>\n");
    }
    for (earlier, later) in graph.edges() {
        out.push_str(&format!(
            "    <edge source=\"e{earlier}\" target=\"e{later}\"/>\n"
        ));
    }

    out.push_str("  </graph>\n</graphml>\n");
    out
}
