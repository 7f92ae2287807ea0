//! Graphviz DOT syntax

use super::{DiagramRenderer, Layout};

/// Attributes applied to edges that lie on a recorded cycle
pub const CYCLE_EDGE_ATTRS: &str = "color=\"red\", penwidth=3, label=\"cycle\"";

/// Renders `digraph` documents with one cluster per module
pub struct DotRenderer;

impl DotRenderer {
    fn quote(text: &str) -> String {
        format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
    }

    fn push_edges(lines: &mut Vec<String>, layout: &Layout<'_>) {
        for edge in &layout.edges {
            if edge.in_cycle {
                lines.push(format!("  n{} -> n{} [{}];", edge.from, edge.to, CYCLE_EDGE_ATTRS));
            } else {
                lines.push(format!("  n{} -> n{};", edge.from, edge.to));
            }
        }
    }
}

impl DiagramRenderer for DotRenderer {
    fn render_call_graph(&self, layout: &Layout<'_>) -> String {
        let mut lines = vec![
            "digraph call_graph {".to_string(),
            "  rankdir=TB;".to_string(),
            "  node [shape=box];".to_string(),
        ];

        for (group, (module, members)) in layout.clusters.iter().enumerate() {
            lines.push(format!("  subgraph cluster_{} {{", group));
            lines.push(format!("    label={};", Self::quote(module)));
            for &id in members {
                lines.push(format!("    n{} [label={}];", id, Self::quote(layout.labels[id])));
            }
            lines.push("  }".to_string());
        }

        Self::push_edges(&mut lines, layout);
        lines.push("}".to_string());
        lines.join("\n") + "\n"
    }

    fn render_import_graph(&self, layout: &Layout<'_>) -> String {
        let mut lines = vec!["digraph import_graph {".to_string()];

        for (id, label) in layout.labels.iter().enumerate() {
            lines.push(format!("  n{} [label={}];", id, Self::quote(label)));
        }

        Self::push_edges(&mut lines, layout);
        lines.push("}".to_string());
        lines.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::cycle_edges;
    use crate::graph::DependencyGraph;

    #[test]
    fn test_call_graph_clusters_and_cycle_attrs() {
        let graph: DependencyGraph = [("a.f", "a.g"), ("a.g", "a.f"), ("a.g", "b.h")].into_iter().collect();
        let cycles = vec![vec!["a.f".to_string(), "a.g".into(), "a.f".into()]];

        let out = DotRenderer.render_call_graph(&Layout::call_graph(&graph, &cycle_edges(&cycles)));

        assert!(out.starts_with("digraph call_graph {\n"));
        assert!(out.contains("  subgraph cluster_0 {\n    label=\"a\";\n    n0 [label=\"a.f\"];\n    n1 [label=\"a.g\"];\n  }\n"));
        assert!(out.contains("  subgraph cluster_1 {\n    label=\"b\";\n    n2 [label=\"b.h\"];\n  }\n"));
        assert!(out.contains("  n0 -> n1 [color=\"red\", penwidth=3, label=\"cycle\"];\n"));
        assert!(out.contains("  n1 -> n0 [color=\"red\", penwidth=3, label=\"cycle\"];\n"));
        assert!(out.contains("  n1 -> n2;\n"));
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(DotRenderer::quote("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn test_import_graph_has_no_clusters() {
        let graph: DependencyGraph = [("app", "os")].into_iter().collect();

        let out = DotRenderer.render_import_graph(&Layout::flat(&graph));

        assert_eq!(out, "digraph import_graph {\n  n0 [label=\"app\"];\n  n1 [label=\"os\"];\n  n0 -> n1;\n}\n");
    }
}
