//! Graph Exporter - cycle-annotated diagram descriptions
//!
//! The exporter computes everything format-independent (module grouping,
//! stable vertex ids, which edges lie on a recorded cycle) once, and hands
//! the resulting layout to a [`DiagramRenderer`] for the concrete syntax.

pub mod dot;
pub mod mermaid;

use std::collections::{BTreeMap, BTreeSet};
use serde::{Deserialize, Serialize};
use crate::graph::DependencyGraph;
use crate::scope::SCOPE_SEPARATOR;

pub use dot::DotRenderer;
pub use mermaid::MermaidRenderer;

/// Diagram syntax to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiagramFormat {
    #[default]
    Mermaid,
    Dot,
}

impl DiagramFormat {
    /// File extension of written diagrams
    pub fn extension(&self) -> &'static str {
        match self {
            DiagramFormat::Mermaid => "mmd",
            DiagramFormat::Dot => "dot",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramFormat::Mermaid => "mermaid",
            DiagramFormat::Dot => "dot",
        }
    }
}

impl std::fmt::Display for DiagramFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module a node belongs to: everything before the first separator
pub fn module_of(node: &str) -> &str {
    node.split(SCOPE_SEPARATOR).next().unwrap_or(node)
}

/// Every consecutive `(from, to)` pair of every cycle
pub fn cycle_edges(cycles: &[Vec<String>]) -> BTreeSet<(String, String)> {
    cycles
        .iter()
        .flat_map(|cycle| cycle.windows(2))
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}

/// Partition every node of a graph (keys and successors) by module
pub fn module_groups(graph: &DependencyGraph) -> BTreeMap<&str, Vec<&str>> {
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for node in graph.all_nodes() {
        groups.entry(module_of(node)).or_default().push(node);
    }
    groups
}

/// A directed edge ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEdge {
    pub from: usize,
    pub to: usize,
    pub in_cycle: bool,
}

/// Format-independent view of a graph: vertex ids, clusters and edges
#[derive(Debug, Clone, Default)]
pub struct Layout<'a> {
    /// Vertex labels; a vertex's id is its index
    pub labels: Vec<&'a str>,
    /// Module name → vertex ids, empty for flat layouts
    pub clusters: BTreeMap<&'a str, Vec<usize>>,
    pub edges: Vec<LayoutEdge>,
}

impl<'a> Layout<'a> {
    fn vertices(graph: &'a DependencyGraph) -> (Vec<&'a str>, BTreeMap<&'a str, usize>) {
        let labels: Vec<&str> = graph.all_nodes().into_iter().collect();
        let ids = labels.iter().enumerate().map(|(i, l)| (*l, i)).collect();
        (labels, ids)
    }

    /// Clustered layout of a call graph with cycle edges flagged
    pub fn call_graph(graph: &'a DependencyGraph, cycle_edges: &BTreeSet<(String, String)>) -> Self {
        let (labels, ids) = Self::vertices(graph);

        let clusters = module_groups(graph)
            .into_iter()
            .map(|(module, nodes)| (module, nodes.iter().map(|n| ids[n]).collect()))
            .collect();

        let edges = graph
            .edges()
            .map(|(from, to)| LayoutEdge {
                from: ids[from],
                to: ids[to],
                in_cycle: cycle_edges.contains(&(from.to_string(), to.to_string())),
            })
            .collect();

        Self { labels, clusters, edges }
    }

    /// Flat layout of an import graph
    pub fn flat(graph: &'a DependencyGraph) -> Self {
        let (labels, ids) = Self::vertices(graph);
        let edges = graph
            .edges()
            .map(|(from, to)| LayoutEdge {
                from: ids[from],
                to: ids[to],
                in_cycle: false,
            })
            .collect();

        Self {
            labels,
            clusters: BTreeMap::new(),
            edges,
        }
    }
}

/// Concrete diagram syntax
pub trait DiagramRenderer {
    /// Clustered call graph; cycle edges must be visually distinct
    fn render_call_graph(&self, layout: &Layout<'_>) -> String;

    /// Flat import graph
    fn render_import_graph(&self, layout: &Layout<'_>) -> String;
}

/// Rendered diagram documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagrams {
    pub call_graph: String,
    /// `None` when no import graph was supplied
    pub import_graph: Option<String>,
}

/// Renders graphs in the configured [`DiagramFormat`]
pub struct GraphExporter {
    format: DiagramFormat,
}

impl GraphExporter {
    pub fn new(format: DiagramFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> DiagramFormat {
        self.format
    }

    fn renderer(&self) -> Box<dyn DiagramRenderer> {
        match self.format {
            DiagramFormat::Mermaid => Box::new(MermaidRenderer),
            DiagramFormat::Dot => Box::new(DotRenderer),
        }
    }

    /// Render the call graph and, when supplied and non-empty, the import graph
    pub fn export(
        &self,
        call_graph: &DependencyGraph,
        import_graph: Option<&DependencyGraph>,
        cycles: &[Vec<String>],
    ) -> Diagrams {
        let renderer = self.renderer();
        let highlighted = cycle_edges(cycles);

        let call_layout = Layout::call_graph(call_graph, &highlighted);
        let call_diagram = renderer.render_call_graph(&call_layout);

        let import_diagram = import_graph
            .filter(|g| !g.is_empty())
            .map(|g| renderer.render_import_graph(&Layout::flat(g)));

        tracing::debug!(
            "Exported {} diagram: {} vertices, {} edges ({} on cycles)",
            self.format,
            call_layout.labels.len(),
            call_layout.edges.len(),
            call_layout.edges.iter().filter(|e| e.in_cycle).count()
        );

        Diagrams {
            call_graph: call_diagram,
            import_graph: import_diagram,
        }
    }
}

impl Default for GraphExporter {
    fn default() -> Self {
        Self::new(DiagramFormat::default())
    }
}
