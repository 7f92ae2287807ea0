//! Language Adapter Framework
//!
//! Each language provides a tree-sitter grammar and a lowering step that
//! maps concrete parse nodes onto [`crate::syntax::NodeKind`]. The walker
//! never sees language-specific node names.

pub mod framework;
pub mod python;

pub use framework::{LanguageAdapter, AdapterRegistry, default_registry};
pub use python::PythonAdapter;
