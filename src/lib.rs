//! # Callmap - Scope-aware dependency model for Python codebases
//!
//! Callmap turns a tree of Python source files into:
//! - A call graph between code scopes (`module.Class.function`)
//! - An import graph between modules
//! - The cycles hidden in either graph
//! - Cycle-highlighted diagram descriptions (Mermaid or Graphviz DOT)
//!
//! Resolution is purely lexical: aliases come from import statements and
//! everything else is qualified with the enclosing module name.

pub mod syntax;
pub mod adapter;
pub mod scope;
pub mod graph;
pub mod aggregate;
pub mod cycles;
pub mod export;
pub mod document;
pub mod pipeline;
pub mod ignore;
pub mod ui;
pub mod output;
pub mod config;

use std::path::PathBuf;

// Re-exports for convenient access
pub use syntax::{NodeId, NodeKind, SyntaxTree};
pub use scope::{SyntaxWalker, WalkOutput};
pub use graph::{DependencyGraph, GraphDocument};
pub use aggregate::{Aggregation, Aggregator};
pub use cycles::{find_cycles, Cycle};
pub use export::{DiagramFormat, GraphExporter};

/// Result type alias for Callmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Callmap operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Syntax tree nesting exceeds the depth limit of {limit}")]
    DepthLimit { limit: usize },

    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("Missing artifact {} (run the `{stage}` stage first)", .path.display())]
    MissingArtifact { path: PathBuf, stage: &'static str },

    #[error("Malformed document {}: {reason}", .path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Message sent from parallel file workers to the aggregating coordinator
#[derive(Debug)]
pub enum FileMessage {
    Processed {
        path: PathBuf,
        output: WalkOutput,
    },
    Failed {
        path: PathBuf,
        reason: String,
    },
}

impl FileMessage {
    /// Path of the file this message reports on
    pub fn path(&self) -> &std::path::Path {
        match self {
            FileMessage::Processed { path, .. } | FileMessage::Failed { path, .. } => path,
        }
    }
}
