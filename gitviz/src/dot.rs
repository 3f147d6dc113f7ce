//! Graphviz serialization of the object graph.
//!
//! The document holds two clusters: commit ancestry, and the full object
//! graph with commit → tree, tree → entry and delta provenance edges. Nodes
//! are identified by their abbreviated hash.
use std::fmt;

use crate::graph::Graph;
use crate::object::{Data, Object};

/// Maximum number of summary characters shown in a commit label.
pub const SUMMARY_LEN: usize = 11;

/// Name of the cluster holding commit ancestry.
pub const COMMITS_CLUSTER: &str = "cluster_commits";
/// Name of the cluster holding every object.
pub const OBJECTS_CLUSTER: &str = "cluster_objects";

/// A DOT document describing a [`Graph`].
pub struct Document<'a> {
    graph: &'a Graph,
}

impl<'a> Document<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    fn commits(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (hash, commit) in self.graph.commits() {
            let id = hash.short();

            writeln!(
                f,
                "\"{id}\" [label = \"{id}\\n{}..\", pos = \"0.0,1.0!\"];",
                summary(&commit.summary)
            )?;
            for parent in &commit.parents {
                writeln!(f, "\"{id}\" -> \"{}\";", parent.short())?;
            }
        }
        Ok(())
    }

    fn objects(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for object in self.graph.objects() {
            let id = object.hash().short();

            match object.data() {
                Data::Commit(commit) => {
                    writeln!(f, "\"{id}\" -> \"{}\";", commit.tree.short())?;
                }
                Data::Tree(tree) => {
                    node(f, object, "triangle")?;
                    for (name, target) in tree.entries() {
                        writeln!(
                            f,
                            "\"{id}\" -> \"{}\" [label = \"{}\"];",
                            target.short(),
                            escape(name)
                        )?;
                    }
                    delta(f, object)?;
                }
                Data::Blob => {
                    node(f, object, "note")?;
                    delta(f, object)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph G {{")?;

        writeln!(f, "subgraph {COMMITS_CLUSTER} {{")?;
        self.commits(f)?;
        writeln!(f, "}}")?;

        writeln!(f, "subgraph {OBJECTS_CLUSTER} {{")?;
        self.objects(f)?;
        writeln!(f, "}}")?;

        writeln!(f, "}}")
    }
}

/// Serialize the graph to a DOT document.
pub fn document(graph: &Graph) -> String {
    Document::new(graph).to_string()
}

fn node(f: &mut fmt::Formatter<'_>, object: &Object, shape: &str) -> fmt::Result {
    let id = object.hash().short();

    write!(f, "\"{id}\" [label = \"{id}\", shape = {shape}")?;
    if object.is_delta_derived() {
        write!(f, ", color = gray")?;
    }
    writeln!(f, "];")
}

/// Dashed provenance edge from the delta base, which doesn't constrain the layout.
fn delta(f: &mut fmt::Formatter<'_>, object: &Object) -> fmt::Result {
    if let Some(base) = object.delta_base() {
        writeln!(
            f,
            "\"{}\" -> \"{}\" [label = \"diff\", color = gray, style = dashed, constraint = false];",
            base.short(),
            object.hash().short()
        )?;
    }
    Ok(())
}

/// Commit summary as shown in a label: truncated, with quotes removed.
fn summary(s: &str) -> String {
    let truncated = s
        .chars()
        .take(SUMMARY_LEN)
        .filter(|c| *c != '"')
        .collect::<String>();

    escape(&truncated)
}

/// Escape a string for use inside a quoted DOT identifier.
fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}
