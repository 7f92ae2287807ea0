//! Syntax Tree - language-neutral typed nodes
//!
//! Language adapters lower their concrete parse trees into this arena.
//! The walker only ever sees [`NodeKind`], so traversal is a single
//! `match` over a closed set of node kinds.

/// Index of a node inside a [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// One name bound by an import statement (`name as alias`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    /// The imported name, dotted for plain imports (`os.path`)
    pub name: String,
    /// Local alias, if any
    pub alias: Option<String>,
}

impl ImportedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// The name visible in the importing file
    pub fn bound_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// The kinds of node the walker distinguishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// File root
    Module,
    /// `import a.b as c, d`
    Import { names: Vec<ImportedName> },
    /// `from module import a as b`; `module` is `None` when no module is named
    ImportFrom {
        module: Option<String>,
        names: Vec<ImportedName>,
    },
    ClassDef { name: String },
    FunctionDef { name: String },
    /// Call expression; the first child is the call target
    Call,
    Name { id: String },
    /// `receiver.member`; the receiver stays a child node
    Attribute { member: String },
    /// Anything without meaning to the walker
    Other,
}

#[derive(Debug, Clone)]
struct SyntaxNode {
    kind: NodeKind,
    children: Vec<NodeId>,
}

/// Arena-backed syntax tree rooted at a [`NodeKind::Module`] node
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    /// Create a tree holding only the module root
    pub fn new() -> Self {
        Self {
            nodes: vec![SyntaxNode {
                kind: NodeKind::Module,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a node as the last child of `parent`
    pub fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SyntaxNode {
            kind,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// The expression being called, for a [`NodeKind::Call`] node
    pub fn call_target(&self, call: NodeId) -> Option<NodeId> {
        match self.kind(call) {
            NodeKind::Call => self.children(call).first().copied(),
            _ => None,
        }
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_child_order() {
        let mut tree = SyntaxTree::new();
        let root = tree.root();
        let a = tree.push(root, NodeKind::FunctionDef { name: "a".into() });
        let b = tree.push(root, NodeKind::FunctionDef { name: "b".into() });

        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.len(), 3);
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_call_target_is_first_child() {
        let mut tree = SyntaxTree::new();
        let call = tree.push(tree.root(), NodeKind::Call);
        let target = tree.push(call, NodeKind::Name { id: "f".into() });
        tree.push(call, NodeKind::Other);

        assert_eq!(tree.call_target(call), Some(target));
        assert_eq!(tree.call_target(target), None);
    }

    #[test]
    fn test_bound_name_prefers_alias() {
        assert_eq!(ImportedName::new("os.path").bound_name(), "os.path");
        assert_eq!(ImportedName::aliased("numpy", "np").bound_name(), "np");
    }
}
