//! Mermaid flowchart syntax

use super::{DiagramRenderer, Layout};

/// Stroke applied to edges that lie on a recorded cycle
pub const CYCLE_LINK_STYLE: &str = "stroke:red,stroke-width:3px";

/// Renders `graph TD` flowcharts
pub struct MermaidRenderer;

impl MermaidRenderer {
    fn vertex_id(id: usize) -> String {
        format!("n{}", id)
    }

    fn label(text: &str) -> String {
        format!("\"{}\"", text.replace('"', "#quot;"))
    }

    fn push_edges(lines: &mut Vec<String>, layout: &Layout<'_>) -> Vec<usize> {
        let mut highlighted = Vec::new();
        for (index, edge) in layout.edges.iter().enumerate() {
            let arrow = if edge.in_cycle {
                highlighted.push(index);
                "-->|cycle|"
            } else {
                "-->"
            };
            lines.push(format!(
                "  {} {} {}",
                Self::vertex_id(edge.from),
                arrow,
                Self::vertex_id(edge.to)
            ));
        }
        highlighted
    }
}

impl DiagramRenderer for MermaidRenderer {
    fn render_call_graph(&self, layout: &Layout<'_>) -> String {
        let mut lines = vec!["graph TD".to_string()];

        for (group, (module, members)) in layout.clusters.iter().enumerate() {
            lines.push(format!("  subgraph g{} [{}]", group, Self::label(module)));
            for &id in members {
                lines.push(format!("    {}[{}]", Self::vertex_id(id), Self::label(layout.labels[id])));
            }
            lines.push("  end".to_string());
        }

        let highlighted = Self::push_edges(&mut lines, layout);

        // linkStyle addresses edges by declaration order
        if !highlighted.is_empty() {
            let indices: Vec<String> = highlighted.iter().map(|i| i.to_string()).collect();
            lines.push(format!("  linkStyle {} {};", indices.join(","), CYCLE_LINK_STYLE));
        }

        lines.join("\n") + "\n"
    }

    fn render_import_graph(&self, layout: &Layout<'_>) -> String {
        let mut lines = vec!["graph TD".to_string()];

        for (id, label) in layout.labels.iter().enumerate() {
            lines.push(format!("  {}[{}]", Self::vertex_id(id), Self::label(label)));
        }
        Self::push_edges(&mut lines, layout);

        lines.join("\n") + "\n"
    }
}
