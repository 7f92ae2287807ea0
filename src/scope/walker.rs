//! Syntax Walker - builds the file-local call and import graphs
//!
//! The walk is iterative: an explicit stack of enter/exit frames replaces
//! native recursion, and a depth guard rejects pathologically nested files.

use crate::{Error, Result};
use crate::graph::DependencyGraph;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};
use super::context::{AliasTable, ScopeContext};
use super::resolver::resolve_callee;

/// Default maximum nesting depth of syntax nodes.
///
/// Operator and call chains nest one level per term, so the bound only
/// rejects adversarial input.
pub const DEFAULT_MAX_DEPTH: usize = 100_000;

/// Everything one file contributes to the global model
#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    /// Module name the file was walked as
    pub module: String,
    /// Scope → callee identifiers
    pub call_graph: DependencyGraph,
    /// Module → imported modules
    pub import_graph: DependencyGraph,
    /// Import aliases seen in the file
    pub aliases: AliasTable,
}

enum Frame {
    Enter { node: NodeId, depth: usize },
    ExitClass,
    ExitFunction,
}

/// Walks one [`SyntaxTree`] at a time
#[derive(Debug, Clone)]
pub struct SyntaxWalker {
    max_depth: usize,
}

impl SyntaxWalker {
    pub fn new() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Walk a file's tree as `module`
    pub fn walk(&self, tree: &SyntaxTree, module: &str) -> Result<WalkOutput> {
        let mut ctx = ScopeContext::new(module);
        let mut stack = vec![Frame::Enter { node: tree.root(), depth: 0 }];

        while let Some(frame) = stack.pop() {
            let (node, depth) = match frame {
                Frame::ExitClass => {
                    ctx.exit_class();
                    continue;
                }
                Frame::ExitFunction => {
                    ctx.exit_function();
                    continue;
                }
                Frame::Enter { node, depth } => (node, depth),
            };

            if depth > self.max_depth {
                return Err(Error::DepthLimit { limit: self.max_depth });
            }

            match tree.kind(node) {
                NodeKind::Import { names } => {
                    for imported in names {
                        ctx.add_alias(imported.bound_name(), imported.name.clone());
                        ctx.add_import(&imported.name);
                    }
                }
                // No resolvable module: the statement and its subtree are skipped
                NodeKind::ImportFrom { module: None, .. } => continue,
                NodeKind::ImportFrom { module: Some(source), names } => {
                    for imported in names {
                        ctx.add_alias(
                            imported.bound_name(),
                            format!("{}.{}", source, imported.name),
                        );
                    }
                    ctx.add_import(source);
                }
                NodeKind::ClassDef { name } => {
                    ctx.enter_class(name);
                    stack.push(Frame::ExitClass);
                }
                NodeKind::FunctionDef { name } => {
                    ctx.enter_function(name);
                    stack.push(Frame::ExitFunction);
                }
                NodeKind::Call => {
                    if let Some(caller) = ctx.current_scope() {
                        if let Some(callee) = resolve_callee(tree, node, &ctx) {
                            ctx.add_call(caller, callee);
                        }
                    }
                }
                NodeKind::Module
                | NodeKind::Name { .. }
                | NodeKind::Attribute { .. }
                | NodeKind::Other => {}
            }

            // Exit frames sit below the children, so they run after them
            for &child in tree.children(node).iter().rev() {
                stack.push(Frame::Enter { node: child, depth: depth + 1 });
            }
        }

        let (module, call_graph, import_graph, aliases) = ctx.into_parts();
        tracing::debug!(
            "Walked {}: {} scopes, {} import edges",
            module,
            call_graph.node_count(),
            import_graph.edge_count()
        );

        Ok(WalkOutput {
            module,
            call_graph,
            import_graph,
            aliases,
        })
    }
}

impl Default for SyntaxWalker {
    fn default() -> Self {
        Self::new()
    }
}
