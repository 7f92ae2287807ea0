//! Traversal context for one file
//!
//! The context tracks:
//! - The enclosing class and function chains (for scope identifiers)
//! - Aliases introduced by import statements
//! - The file-local call and import graphs

use std::collections::BTreeMap;
use crate::graph::DependencyGraph;

/// Separator between segments of a scope identifier
pub const SCOPE_SEPARATOR: &str = ".";

/// Per-file mapping from a locally used name to its qualified origin.
///
/// Populated only by import statements; one table covers the whole file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `local` to `origin`, replacing any earlier binding
    pub fn insert(&mut self, local: impl Into<String>, origin: impl Into<String>) {
        self.entries.insert(local.into(), origin.into());
    }

    pub fn resolve(&self, local: &str) -> Option<&str> {
        self.entries.get(local).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Mutable state threaded through a single file walk
#[derive(Debug)]
pub struct ScopeContext {
    module: String,
    classes: Vec<String>,
    functions: Vec<String>,
    aliases: AliasTable,
    call_graph: DependencyGraph,
    import_graph: DependencyGraph,
}

impl ScopeContext {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            classes: Vec::new(),
            functions: Vec::new(),
            aliases: AliasTable::new(),
            call_graph: DependencyGraph::new(),
            import_graph: DependencyGraph::new(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn enter_class(&mut self, name: &str) {
        self.classes.push(name.to_string());
    }

    pub fn exit_class(&mut self) {
        self.classes.pop();
    }

    /// Enter a function and register the new scope as a call-graph node,
    /// so leaf functions appear even without outgoing calls.
    pub fn enter_function(&mut self, name: &str) {
        self.functions.push(name.to_string());
        if let Some(scope) = self.current_scope() {
            self.call_graph.add_node(scope);
        }
    }

    pub fn exit_function(&mut self) {
        self.functions.pop();
    }

    /// `module.Class….function…`, or `None` outside any function
    pub fn current_scope(&self) -> Option<String> {
        if self.functions.is_empty() {
            return None;
        }

        let segments: Vec<&str> = std::iter::once(self.module.as_str())
            .chain(self.classes.iter().map(String::as_str))
            .chain(self.functions.iter().map(String::as_str))
            .collect();
        Some(segments.join(SCOPE_SEPARATOR))
    }

    /// Qualify a name with this file's module
    pub fn qualify(&self, name: &str) -> String {
        format!("{}{}{}", self.module, SCOPE_SEPARATOR, name)
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn add_alias(&mut self, local: &str, origin: impl Into<String>) {
        self.aliases.insert(local, origin);
    }

    pub fn add_call(&mut self, caller: String, callee: String) {
        self.call_graph.add_edge(caller, callee);
    }

    /// Record that this module imports `target`
    pub fn add_import(&mut self, target: &str) {
        let module = self.module.clone();
        self.import_graph.add_edge(module, target);
    }

    pub fn into_parts(self) -> (String, DependencyGraph, DependencyGraph, AliasTable) {
        (self.module, self.call_graph, self.import_graph, self.aliases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_scope_outside_functions() {
        let mut ctx = ScopeContext::new("app");
        assert_eq!(ctx.current_scope(), None);

        ctx.enter_class("Service");
        assert_eq!(ctx.current_scope(), None);
    }

    #[test]
    fn test_scope_joins_classes_then_functions() {
        let mut ctx = ScopeContext::new("app");
        ctx.enter_class("Outer");
        ctx.enter_class("Inner");
        ctx.enter_function("run");
        ctx.enter_function("step");

        assert_eq!(ctx.current_scope().as_deref(), Some("app.Outer.Inner.run.step"));

        ctx.exit_function();
        ctx.exit_class();
        assert_eq!(ctx.current_scope().as_deref(), Some("app.Outer.run"));
    }

    #[test]
    fn test_enter_function_registers_leaf_scope() {
        let mut ctx = ScopeContext::new("app");
        ctx.enter_function("leaf");
        ctx.exit_function();

        let (_, calls, _, _) = ctx.into_parts();
        assert_eq!(calls.successors("app.leaf").map(|s| s.len()), Some(0));
    }

    #[test]
    fn test_alias_rebinding_keeps_latest() {
        let mut table = AliasTable::new();
        table.insert("h", "a.helper");
        table.insert("h", "b.helper");

        assert_eq!(table.resolve("h"), Some("b.helper"));
        assert_eq!(table.len(), 1);
    }
}
