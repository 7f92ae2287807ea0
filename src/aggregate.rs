//! Graph Aggregator - discovery, per-file analysis and the global merge
//!
//! Files are analyzed on scoped worker threads. Workers pull paths from one
//! channel and report a [`FileMessage`] per file on another; the coordinator
//! sorts the messages by path and merges them in that order, so the merged
//! graphs do not depend on which worker finished first.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use crossbeam::channel::{unbounded, Sender};
use ignore::WalkBuilder;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use crate::{Error, FileMessage, Result};
use crate::adapter::{default_registry, AdapterRegistry};
use crate::graph::{DependencyGraph, GraphDocument, GraphStats};
use crate::ignore::ExcludeFilter;
use crate::scope::{SyntaxWalker, WalkOutput};
use crate::ui::{ProgressMessage, ProgressPhase};

/// A file that could not be analyzed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Merged result of one aggregation run
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub call_graph: DependencyGraph,
    pub import_graph: DependencyGraph,
    pub files_analyzed: usize,
    pub failures: Vec<FileFailure>,
    /// Module name → every file that produced it, for names seen more than once
    pub collisions: BTreeMap<String, Vec<PathBuf>>,
}

impl Aggregation {
    /// Whether any file failed to analyze
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats::new(self.files_analyzed, &self.call_graph, &self.import_graph)
    }

    pub fn to_document(&self) -> GraphDocument {
        GraphDocument::new(&self.call_graph, &self.import_graph)
    }
}

/// Module name of a source file: its stem
pub fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Drives the adapter and walker over a file tree
pub struct Aggregator {
    registry: AdapterRegistry,
    walker: SyntaxWalker,
    workers: usize,
    respect_ignore: bool,
    exclude: Vec<String>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            registry: default_registry(),
            walker: SyntaxWalker::new(),
            workers: default_workers(),
            respect_ignore: false,
            exclude: Vec::new(),
        }
    }

    pub fn with_registry(mut self, registry: AdapterRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.walker = self.walker.with_max_depth(max_depth);
        self
    }

    /// Worker thread count; zero is treated as one
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_respect_ignore(mut self, respect_ignore: bool) -> Self {
        self.respect_ignore = respect_ignore;
        self
    }

    pub fn with_excludes(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Source files under `root`, sorted.
    ///
    /// A file path is returned as-is if an adapter handles it.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.exists() {
            return Err(Error::PathNotFound(root.to_path_buf()));
        }

        if root.is_file() {
            if !self.registry.supports(root) {
                return Err(Error::Adapter(format!("no adapter handles {}", root.display())));
            }
            return Ok(vec![root.to_path_buf()]);
        }

        let filter = ExcludeFilter::new(root, &self.exclude);
        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(self.respect_ignore)
            .require_git(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !filter.is_excluded(entry.path(), is_dir)
            });

        let mut files = Vec::new();
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if self.registry.supports(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        debug!("Discovered {} source files under {}", files.len(), root.display());
        Ok(files)
    }

    /// Read, parse and walk one file
    pub fn analyze_file(&self, path: &Path) -> Result<WalkOutput> {
        let adapter = self
            .registry
            .find_adapter(path)
            .ok_or_else(|| Error::Adapter(format!("no adapter handles {}", path.display())))?;

        let source = std::fs::read_to_string(path)?;
        let tree = adapter.parse(&source)?;
        self.walker.walk(&tree, &module_name(path))
    }

    /// Analyze every file under `root` and merge the results
    pub fn run(&self, root: &Path, progress: Option<&Sender<ProgressMessage>>) -> Result<Aggregation> {
        let files = self.discover(root)?;
        info!("Analyzing {} files with {} workers", files.len(), self.workers.min(files.len()).max(1));

        let mut messages = self.process_files(&files, progress);
        messages.sort_by(|a, b| a.path().cmp(b.path()));

        let mut aggregation = Aggregation::default();
        let mut origins: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

        for message in messages {
            match message {
                FileMessage::Processed { path, output } => {
                    origins.entry(output.module).or_default().push(path);
                    aggregation.call_graph.merge(output.call_graph);
                    aggregation.import_graph.merge(output.import_graph);
                    aggregation.files_analyzed += 1;
                }
                FileMessage::Failed { path, reason } => {
                    error!("Failed to analyze {}: {}", path.display(), reason);
                    aggregation.failures.push(FileFailure { path, reason });
                }
            }
        }

        aggregation.collisions = origins
            .into_iter()
            .filter(|(_, paths)| paths.len() > 1)
            .collect();
        for (module, paths) in &aggregation.collisions {
            warn!("Module name `{}` is shared by {} files; their scopes are merged", module, paths.len());
        }

        info!(
            "Aggregated {} files: {} scopes, {} call edges, {} failures",
            aggregation.files_analyzed,
            aggregation.call_graph.node_count(),
            aggregation.call_graph.edge_count(),
            aggregation.failures.len()
        );
        Ok(aggregation)
    }

    fn process_files(&self, files: &[PathBuf], progress: Option<&Sender<ProgressMessage>>) -> Vec<FileMessage> {
        let report = |msg: ProgressMessage| {
            if let Some(tx) = progress {
                let _ = tx.send(msg);
            }
        };
        report(ProgressMessage::Started {
            phase: ProgressPhase::Parsing,
            total: files.len(),
        });

        let (path_tx, path_rx) = unbounded::<&Path>();
        let (result_tx, result_rx) = unbounded::<FileMessage>();
        for file in files {
            let _ = path_tx.send(file.as_path());
        }
        drop(path_tx);

        let workers = self.workers.min(files.len()).max(1);
        let messages = std::thread::scope(|s| {
            for _ in 0..workers {
                let path_rx = path_rx.clone();
                let result_tx = result_tx.clone();
                s.spawn(move || {
                    for path in path_rx {
                        let message = match self.analyze_file(path) {
                            Ok(output) => FileMessage::Processed {
                                path: path.to_path_buf(),
                                output,
                            },
                            Err(e) => FileMessage::Failed {
                                path: path.to_path_buf(),
                                reason: e.to_string(),
                            },
                        };
                        if result_tx.send(message).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            let mut messages = Vec::with_capacity(files.len());
            for message in result_rx.iter() {
                if let FileMessage::Failed { path, reason } = &message {
                    report(ProgressMessage::Error(format!("{}: {}", path.display(), reason)));
                }
                report(ProgressMessage::Progress {
                    phase: ProgressPhase::Parsing,
                    current: messages.len() + 1,
                    file: Some(message.path().display().to_string()),
                });
                messages.push(message);
            }
            messages
        });

        report(ProgressMessage::Finished {
            phase: ProgressPhase::Parsing,
        });
        messages
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, contents: &str) -> PathBuf {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_module_name_is_file_stem() {
        assert_eq!(module_name(Path::new("pkg/sub/util.py")), "util");
        assert_eq!(module_name(Path::new("stubs/api.pyi")), "api");
    }

    #[test]
    fn test_same_module_name_merges_and_is_reported() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a/util.py", "def helper():\n    inner()\n");
        write(dir.path(), "b/util.py", "def other():\n    pass\n");

        let agg = Aggregator::new().with_workers(2).run(dir.path(), None).unwrap();

        assert!(agg.call_graph.contains_key("util.helper"));
        assert!(agg.call_graph.contains_key("util.other"));
        assert_eq!(agg.files_analyzed, 2);
        let paths = &agg.collisions["util"];
        assert_eq!(paths.len(), 2);
        assert!(paths[0] < paths[1]);
    }

    #[test]
    fn test_parse_failure_is_isolated() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "good.py", "def ok():\n    run()\n");
        let bad = write(dir.path(), "bad.py", "def broken(:\n    pass\n");

        let agg = Aggregator::new().run(dir.path(), None).unwrap();

        assert!(agg.is_partial());
        assert_eq!(agg.failures.len(), 1);
        assert_eq!(agg.failures[0].path, bad);
        assert_eq!(agg.files_analyzed, 1);
        assert!(agg.call_graph.contains_key("good.ok"));
    }

    #[test]
    fn test_output_independent_of_worker_count() {
        let dir = TempDir::new().unwrap();
        for i in 0..12 {
            write(
                dir.path(),
                &format!("pkg{}/mod{}.py", i % 3, i),
                &format!("import shared\n\ndef f{i}():\n    g{i}()\n    shared.work()\n\ndef g{i}():\n    f{i}()\n"),
            );
        }

        let serial = Aggregator::new().with_workers(1).run(dir.path(), None).unwrap();
        let parallel = Aggregator::new().with_workers(6).run(dir.path(), None).unwrap();

        let a = serde_json::to_string(&serial.to_document()).unwrap();
        let b = serde_json::to_string(&parallel.to_document()).unwrap();
        assert_eq!(a, b);
        assert_eq!(serial.stats(), parallel.stats());
    }

    #[test]
    fn test_single_file_input() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "app.py", "def main():\n    run()\n");
        write(dir.path(), "other.py", "def unrelated():\n    pass\n");

        let agg = Aggregator::new().run(&file, None).unwrap();

        assert_eq!(agg.files_analyzed, 1);
        assert!(agg.call_graph.contains_key("app.main"));
        assert!(!agg.call_graph.contains_key("other.unrelated"));
    }

    #[test]
    fn test_missing_path() {
        let dir = TempDir::new().unwrap();

        let err = Aggregator::new().run(&dir.path().join("missing"), None).unwrap_err();
        assert!(matches!(err, Error::PathNotFound(_)));
    }

    #[test]
    fn test_unsupported_single_file() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "notes.txt", "hello");

        assert!(matches!(Aggregator::new().discover(&file), Err(Error::Adapter(_))));
    }

    #[test]
    fn test_discovery_filters() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/app.py", "");
        write(dir.path(), "src/README.md", "");
        write(dir.path(), "vendor/lib.py", "");
        write(dir.path(), "generated/out.py", "");
        write(dir.path(), ".gitignore", "generated/\n");

        let plain = Aggregator::new().discover(dir.path()).unwrap();
        assert_eq!(plain.len(), 3);

        let excluded = Aggregator::new()
            .with_excludes(vec!["vendor/".into()])
            .discover(dir.path())
            .unwrap();
        assert_eq!(excluded.len(), 2);
        assert!(excluded.iter().all(|p| !p.starts_with(dir.path().join("vendor"))));

        let ignoring = Aggregator::new()
            .with_respect_ignore(true)
            .discover(dir.path())
            .unwrap();
        assert_eq!(ignoring.len(), 2);
        assert!(ignoring.iter().all(|p| !p.starts_with(dir.path().join("generated"))));
    }

    #[test]
    fn test_progress_messages() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.py", "def f():\n    pass\n");
        write(dir.path(), "b.py", "def g():\n    pass\n");
        let (tx, rx) = unbounded();

        Aggregator::new().run(dir.path(), Some(&tx)).unwrap();
        drop(tx);

        let messages: Vec<ProgressMessage> = rx.iter().collect();
        assert!(matches!(messages.first(), Some(ProgressMessage::Started { total: 2, .. })));
        assert!(matches!(messages.last(), Some(ProgressMessage::Finished { .. })));
        assert_eq!(
            messages.iter().filter(|m| matches!(m, ProgressMessage::Progress { .. })).count(),
            2
        );
    }
}
