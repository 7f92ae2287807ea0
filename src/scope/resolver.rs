//! Callee Resolver - lexical resolution of call targets
//!
//! Resolution rules:
//! 1. Bare name bound by an import → the import's qualified origin
//! 2. Any other bare name → assumed module-local, `module.name`
//! 3. Attribute call `receiver.member(...)` → `module.member`
//! 4. Anything else (subscripts, nested calls, literals) → unresolved
//!
//! Rule 3 ignores the receiver entirely, so unrelated classes sharing a
//! method name collapse onto one callee identifier.

use crate::syntax::{NodeId, NodeKind, SyntaxTree};
use super::context::ScopeContext;

/// Resolve the callee of a call node, or `None` to drop the call
pub fn resolve_callee(tree: &SyntaxTree, call: NodeId, ctx: &ScopeContext) -> Option<String> {
    let target = tree.call_target(call)?;

    match tree.kind(target) {
        NodeKind::Name { id } => Some(
            ctx.aliases()
                .resolve(id)
                .map(str::to_string)
                .unwrap_or_else(|| ctx.qualify(id)),
        ),
        NodeKind::Attribute { member } => Some(ctx.qualify(member)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_with_target(kind: NodeKind) -> (SyntaxTree, NodeId) {
        let mut tree = SyntaxTree::new();
        let call = tree.push(tree.root(), NodeKind::Call);
        tree.push(call, kind);
        (tree, call)
    }

    #[test]
    fn test_alias_wins_over_module_guess() {
        let mut ctx = ScopeContext::new("app");
        ctx.add_alias("helper", "util.helper");

        let (tree, call) = call_with_target(NodeKind::Name { id: "helper".into() });
        assert_eq!(resolve_callee(&tree, call, &ctx).as_deref(), Some("util.helper"));
    }

    #[test]
    fn test_unknown_name_is_module_local() {
        let ctx = ScopeContext::new("app");

        let (tree, call) = call_with_target(NodeKind::Name { id: "run".into() });
        assert_eq!(resolve_callee(&tree, call, &ctx).as_deref(), Some("app.run"));
    }

    #[test]
    fn test_attribute_ignores_receiver() {
        let mut ctx = ScopeContext::new("app");
        ctx.add_alias("db", "storage.db");

        let mut tree = SyntaxTree::new();
        let call = tree.push(tree.root(), NodeKind::Call);
        let attr = tree.push(call, NodeKind::Attribute { member: "save".into() });
        tree.push(attr, NodeKind::Name { id: "db".into() });

        assert_eq!(resolve_callee(&tree, call, &ctx).as_deref(), Some("app.save"));
    }

    #[test]
    fn test_other_targets_are_dropped() {
        let ctx = ScopeContext::new("app");

        let (tree, call) = call_with_target(NodeKind::Other);
        assert_eq!(resolve_callee(&tree, call, &ctx), None);

        let (tree, call) = call_with_target(NodeKind::Call);
        assert_eq!(resolve_callee(&tree, call, &ctx), None);

        let mut empty = SyntaxTree::new();
        let bare = empty.push(empty.root(), NodeKind::Call);
        assert_eq!(resolve_callee(&empty, bare, &ctx), None);
    }
}
