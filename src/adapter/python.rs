//! Python language adapter
//!
//! Parses Python source with tree-sitter and lowers the concrete tree
//! into a [`SyntaxTree`].

use crate::{Result, Error};
use crate::syntax::{ImportedName, NodeId, NodeKind, SyntaxTree};
use super::framework::LanguageAdapter;
use tree_sitter::{Language, Node, Parser};

/// Python language adapter
pub struct PythonAdapter {
    language: Language,
}

impl PythonAdapter {
    /// Create a new Python adapter
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    /// Lower a tree-sitter tree without recursing on the native stack.
    ///
    /// Children are pushed in reverse so they are popped, and therefore
    /// appended to their parent, in source order.
    fn lower(&self, root: Node, source: &[u8]) -> SyntaxTree {
        let mut tree = SyntaxTree::new();
        let mut stack: Vec<(Node, NodeId)> = Vec::new();
        Self::push_children(root, tree.root(), &mut stack);

        while let Some((node, parent)) = stack.pop() {
            let kind = self.classify(node, source);
            let id = tree.push(parent, kind);
            Self::push_children(node, id, &mut stack);
        }

        tree
    }

    fn push_children<'t>(node: Node<'t>, parent: NodeId, stack: &mut Vec<(Node<'t>, NodeId)>) {
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            stack.push((child, parent));
        }
    }

    /// Map a tree-sitter node kind onto a walker node kind
    fn classify(&self, node: Node, source: &[u8]) -> NodeKind {
        match node.kind() {
            "import_statement" => NodeKind::Import {
                names: self.imported_names(node, source, None),
            },
            "import_from_statement" => {
                let module = node
                    .child_by_field_name("module_name")
                    .and_then(|m| Self::module_path(m, source));
                NodeKind::ImportFrom {
                    module,
                    names: self.imported_names(node, source, Some("name")),
                }
            }
            "future_import_statement" => NodeKind::ImportFrom {
                module: Some("__future__".to_string()),
                names: self.imported_names(node, source, Some("name")),
            },
            "class_definition" => match Self::field_text(node, "name", source) {
                Some(name) => NodeKind::ClassDef { name },
                None => NodeKind::Other,
            },
            "function_definition" => match Self::field_text(node, "name", source) {
                Some(name) => NodeKind::FunctionDef { name },
                None => NodeKind::Other,
            },
            "call" => NodeKind::Call,
            "identifier" => match node.utf8_text(source) {
                Ok(id) => NodeKind::Name { id: id.to_string() },
                Err(_) => NodeKind::Other,
            },
            "attribute" => match Self::field_text(node, "attribute", source) {
                Some(member) => NodeKind::Attribute { member },
                None => NodeKind::Other,
            },
            _ => NodeKind::Other,
        }
    }

    /// Collect `dotted_name` / `aliased_import` entries of an import.
    ///
    /// Plain imports list their names as direct children; from-imports
    /// tag them with the `name` field so the module path is not mistaken
    /// for an imported name.
    fn imported_names(&self, node: Node, source: &[u8], field: Option<&str>) -> Vec<ImportedName> {
        let mut cursor = node.walk();
        let candidates: Vec<Node> = match field {
            Some(field) => node.children_by_field_name(field, &mut cursor).collect(),
            None => node.named_children(&mut cursor).collect(),
        };

        candidates
            .into_iter()
            .filter_map(|child| match child.kind() {
                "dotted_name" => child
                    .utf8_text(source)
                    .ok()
                    .map(ImportedName::new),
                "aliased_import" => {
                    let name = Self::field_text(child, "name", source)?;
                    match Self::field_text(child, "alias", source) {
                        Some(alias) => Some(ImportedName::aliased(name, alias)),
                        None => Some(ImportedName::new(name)),
                    }
                }
                _ => None,
            })
            .collect()
    }

    /// Module named by a from-import, leading relative dots stripped.
    ///
    /// `from . import x` names no module and yields `None`.
    fn module_path(node: Node, source: &[u8]) -> Option<String> {
        let text = node.utf8_text(source).ok()?;
        let path = text.trim_start_matches('.').trim();
        if path.is_empty() {
            None
        } else {
            Some(path.to_string())
        }
    }

    fn field_text(node: Node, field: &str, source: &[u8]) -> Option<String> {
        node.child_by_field_name(field)
            .and_then(|n| n.utf8_text(source).ok())
            .map(str::to_string)
    }

    /// Locate the first error or missing node, for reporting
    fn first_error(root: Node) -> Option<Node> {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                return Some(node);
            }
            let mut cursor = node.walk();
            let children: Vec<Node> = node
                .children(&mut cursor)
                .filter(|c| c.has_error() || c.is_missing())
                .collect();
            stack.extend(children.into_iter().rev());
        }
        None
    }
}

impl Default for PythonAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAdapter for PythonAdapter {
    fn language_name(&self) -> &str {
        "Python"
    }

    fn file_extensions(&self) -> &[&str] {
        &["py", "pyi"]
    }

    fn parse(&self, source: &str) -> Result<SyntaxTree> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)
            .map_err(|e| Error::Adapter(format!("Failed to set language: {}", e)))?;

        let tree = parser.parse(source, None)
            .ok_or_else(|| Error::Parse("tree-sitter produced no tree".to_string()))?;
        let root = tree.root_node();

        if root.has_error() {
            let line = Self::first_error(root)
                .map(|n| n.start_position().row + 1)
                .unwrap_or(1);
            return Err(Error::Parse(format!("invalid syntax near line {}", line)));
        }

        Ok(self.lower(root, source.as_bytes()))
    }
}
