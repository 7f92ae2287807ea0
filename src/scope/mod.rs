//! Scope tracking - lexical context of calls
//!
//! The walker threads a single [`ScopeContext`] through one file's syntax
//! tree; callee identifiers are resolved from import aliases and the
//! enclosing module alone, never from types.

pub mod context;
pub mod resolver;
pub mod walker;

pub use context::{AliasTable, ScopeContext, SCOPE_SEPARATOR};
pub use resolver::resolve_callee;
pub use walker::{SyntaxWalker, WalkOutput, DEFAULT_MAX_DEPTH};
