//! Dependency Graph - node identifier → successor set
//!
//! One structure serves both the call graph (scope → callees) and the
//! import graph (module → imported modules). Ordered containers keep every
//! iteration, and therefore every artifact, deterministic.

use std::collections::{BTreeMap, BTreeSet};
use serde::{Deserialize, Serialize};

/// Directed graph keyed by node identifier.
///
/// A node is a key once it was added explicitly or has outgoing edges;
/// successors that are never added as keys are still nodes of the graph
/// (see [`DependencyGraph::all_nodes`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node, possibly with no successors
    pub fn add_node(&mut self, node: impl Into<String>) {
        self.edges.entry(node.into()).or_default();
    }

    /// Add a directed edge; the source becomes a key
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.edges.entry(from.into()).or_default().insert(to.into());
    }

    /// Union `other` into this graph, key by key
    pub fn merge(&mut self, other: DependencyGraph) {
        for (node, successors) in other.edges {
            self.edges.entry(node).or_default().extend(successors);
        }
    }

    pub fn successors(&self, node: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(node)
    }

    pub fn contains_key(&self, node: &str) -> bool {
        self.edges.contains_key(node)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// `(node, successors)` pairs in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.edges.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every edge as `(from, to)`, sorted by source then destination
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (from.as_str(), to.as_str())))
    }

    /// Keys plus every successor
    pub fn all_nodes(&self) -> BTreeSet<&str> {
        let mut nodes: BTreeSet<&str> = self.keys().collect();
        for successors in self.edges.values() {
            nodes.extend(successors.iter().map(String::as_str));
        }
        nodes
    }

    /// Number of keys
    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Snapshot with successor sets as sorted sequences
    pub fn to_sorted_map(&self) -> BTreeMap<String, Vec<String>> {
        self.edges
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().cloned().collect()))
            .collect()
    }

    pub fn from_sorted_map(map: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            edges: map
                .into_iter()
                .map(|(k, v)| (k, v.into_iter().collect()))
                .collect(),
        }
    }
}

impl<F: Into<String>, T: Into<String>> FromIterator<(F, T)> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = (F, T)>>(iter: I) -> Self {
        let mut graph = DependencyGraph::new();
        for (from, to) in iter {
            graph.add_edge(from, to);
        }
        graph
    }
}

/// Persisted form of the aggregated graphs (`call_graph.json`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub call_graph: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub import_graph: BTreeMap<String, Vec<String>>,
}

impl GraphDocument {
    pub fn new(call_graph: &DependencyGraph, import_graph: &DependencyGraph) -> Self {
        Self {
            call_graph: call_graph.to_sorted_map(),
            import_graph: import_graph.to_sorted_map(),
        }
    }

    pub fn call_graph(&self) -> DependencyGraph {
        DependencyGraph::from_sorted_map(self.call_graph.clone())
    }

    pub fn import_graph(&self) -> DependencyGraph {
        DependencyGraph::from_sorted_map(self.import_graph.clone())
    }
}

/// Statistics about the aggregated graphs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub files: usize,
    pub scopes: usize,
    pub call_edges: usize,
    pub modules: usize,
    pub import_edges: usize,
}

impl GraphStats {
    pub fn new(files: usize, call_graph: &DependencyGraph, import_graph: &DependencyGraph) -> Self {
        Self {
            files,
            scopes: call_graph.node_count(),
            call_edges: call_graph.edge_count(),
            modules: import_graph.node_count(),
            import_edges: import_graph.edge_count(),
        }
    }
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dependency Graph Statistics:")?;
        writeln!(f, "  Files: {}", self.files)?;
        writeln!(f, "  Scopes: {} ({} call edges)", self.scopes, self.call_edges)?;
        writeln!(f, "  Importing modules: {} ({} import edges)", self.modules, self.import_edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_unions_successor_sets() {
        let mut global: DependencyGraph = [("util.a", "util.b")].into_iter().collect();
        let mut local = DependencyGraph::new();
        local.add_edge("util.a", "util.c");
        local.add_edge("util.a", "util.b");
        local.add_node("util.leaf");

        global.merge(local);

        let succ: Vec<&String> = global.successors("util.a").unwrap().iter().collect();
        assert_eq!(succ, vec!["util.b", "util.c"]);
        assert!(global.contains_key("util.leaf"));
        assert_eq!(global.edge_count(), 2);
    }

    #[test]
    fn test_all_nodes_includes_successors() {
        let graph: DependencyGraph = [("a.f", "b.g"), ("a.f", "a.h")].into_iter().collect();

        let nodes: Vec<&str> = graph.all_nodes().into_iter().collect();
        assert_eq!(nodes, vec!["a.f", "a.h", "b.g"]);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_edges_are_sorted() {
        let graph: DependencyGraph = [("b", "z"), ("a", "y"), ("a", "x")].into_iter().collect();

        let edges: Vec<(&str, &str)> = graph.edges().collect();
        assert_eq!(edges, vec![("a", "x"), ("a", "y"), ("b", "z")]);
    }

    #[test]
    fn test_document_serializes_sorted_sequences() {
        let mut calls: DependencyGraph = [("app.main", "app.z"), ("app.main", "app.a")].into_iter().collect();
        calls.add_node("app.leaf");
        let imports: DependencyGraph = [("app", "os")].into_iter().collect();

        let doc = GraphDocument::new(&calls, &imports);
        let json = serde_json::to_string(&doc).unwrap();

        assert_eq!(
            json,
            r#"{"call_graph":{"app.leaf":[],"app.main":["app.a","app.z"]},"import_graph":{"app":["os"]}}"#
        );
        assert_eq!(doc.call_graph(), calls);
    }

    #[test]
    fn test_document_without_import_graph() {
        let doc: GraphDocument = serde_json::from_str(r#"{"call_graph":{"m.f":["m.g"]}}"#).unwrap();

        assert!(doc.import_graph().is_empty());
        assert_eq!(doc.call_graph().edge_count(), 1);
    }

    #[test]
    fn test_stats() {
        let calls: DependencyGraph = [("m.f", "m.g"), ("m.g", "m.f")].into_iter().collect();
        let imports: DependencyGraph = [("m", "os"), ("m", "sys")].into_iter().collect();

        let stats = GraphStats::new(3, &calls, &imports);
        assert_eq!(stats.scopes, 2);
        assert_eq!(stats.call_edges, 2);
        assert_eq!(stats.modules, 1);
        assert_eq!(stats.import_edges, 2);
        assert!(stats.to_string().contains("Files: 3"));
    }
}
