//! Pipeline - stage orchestration and artifact checkpoints
//!
//! The full run passes typed values from stage to stage in-process and
//! writes each stage's artifact as it goes. The standalone stage functions
//! instead start from the previous stage's artifact on disk.

use std::path::{Path, PathBuf};
use crossbeam::channel::Sender;
use tracing::info;
use crate::Result;
use crate::aggregate::{Aggregation, Aggregator};
use crate::cycles::{dedup_rotations, find_cycles, Cycle};
use crate::document::{self, CYCLES_FILE, GRAPH_FILE};
use crate::export::{DiagramFormat, Diagrams, GraphExporter};
use crate::graph::DependencyGraph;
use crate::ui::{ProgressMessage, ProgressPhase};

pub const DIAGRAMS_DIR: &str = "diagrams";

/// Artifact locations under one output directory
#[derive(Debug, Clone)]
pub struct Artifacts {
    dir: PathBuf,
}

impl Artifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn graph_path(&self) -> PathBuf {
        self.dir.join(GRAPH_FILE)
    }

    pub fn cycles_path(&self) -> PathBuf {
        self.dir.join(CYCLES_FILE)
    }

    pub fn diagrams_dir(&self) -> PathBuf {
        self.dir.join(DIAGRAMS_DIR)
    }

    /// `diagrams/<name>.<ext>`
    pub fn diagram_path(&self, name: &str, format: DiagramFormat) -> PathBuf {
        self.diagrams_dir().join(format!("{}.{}", name, format.extension()))
    }
}

/// Which aggregated graph the cycle stage searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleSource {
    #[default]
    CallGraph,
    ImportGraph,
}

/// Detect cycles, optionally dropping rotations of earlier cycles
pub fn detect_cycles(graph: &DependencyGraph, dedupe: bool) -> Vec<Cycle> {
    let cycles = find_cycles(graph);
    if dedupe {
        let before = cycles.len();
        let cycles = dedup_rotations(cycles);
        tracing::debug!("Dropped {} rotated duplicate cycles", before - cycles.len());
        cycles
    } else {
        cycles
    }
}

pub fn write_graph(artifacts: &Artifacts, aggregation: &Aggregation) -> Result<PathBuf> {
    let path = artifacts.graph_path();
    document::write_json(&path, &aggregation.to_document())?;
    Ok(path)
}

pub fn write_cycles(artifacts: &Artifacts, cycles: &[Cycle]) -> Result<PathBuf> {
    let path = artifacts.cycles_path();
    document::write_json(&path, cycles)?;
    Ok(path)
}

/// Write rendered diagrams, returning the paths written
pub fn write_diagrams(artifacts: &Artifacts, format: DiagramFormat, diagrams: &Diagrams) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(artifacts.diagrams_dir())?;

    let call_path = artifacts.diagram_path("call_graph", format);
    std::fs::write(&call_path, &diagrams.call_graph)?;
    let mut written = vec![call_path];

    let import_path = artifacts.diagram_path("import_graph", format);
    match &diagrams.import_graph {
        Some(import_diagram) => {
            std::fs::write(&import_path, import_diagram)?;
            written.push(import_path);
        }
        // A diagram left over from an earlier run no longer describes the graph
        None if import_path.exists() => {
            std::fs::remove_file(&import_path)?;
            tracing::debug!("Removed stale {}", import_path.display());
        }
        None => {}
    }
    Ok(written)
}

/// Cycle stage from a persisted graph document; writes `cycles.json`
pub fn cycles_from_artifact(
    graph_path: &Path,
    artifacts: &Artifacts,
    source: CycleSource,
    dedupe: bool,
) -> Result<Vec<Cycle>> {
    let doc = document::read_graph_document(graph_path)?;
    let graph = match source {
        CycleSource::CallGraph => doc.call_graph(),
        CycleSource::ImportGraph => doc.import_graph(),
    };

    let cycles = detect_cycles(&graph, dedupe);
    write_cycles(artifacts, &cycles)?;
    info!("Found {} cycles in {}", cycles.len(), graph_path.display());
    Ok(cycles)
}

/// Export stage from persisted artifacts.
///
/// An explicitly named cycle document must exist. Otherwise the default
/// `cycles.json` is used when present and no edge is highlighted when not.
pub fn export_from_artifacts(
    graph_path: &Path,
    cycles_path: Option<&Path>,
    artifacts: &Artifacts,
    format: DiagramFormat,
) -> Result<Vec<PathBuf>> {
    let doc = document::read_graph_document(graph_path)?;

    let cycles = match cycles_path {
        Some(path) => document::read_cycles(path)?,
        None => {
            let default = artifacts.cycles_path();
            if default.exists() {
                document::read_cycles(&default)?
            } else {
                Vec::new()
            }
        }
    };

    let imports = doc.import_graph();
    let diagrams = GraphExporter::new(format).export(&doc.call_graph(), Some(&imports), &cycles);
    write_diagrams(artifacts, format, &diagrams)
}

/// Which optional stages a full run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSelection {
    pub cycles: bool,
    pub diagrams: bool,
}

impl StageSelection {
    pub fn all() -> Self {
        Self {
            cycles: true,
            diagrams: true,
        }
    }

    /// No stage requested means every stage
    pub fn from_flags(cycles: bool, diagrams: bool, all: bool) -> Self {
        if all || (!cycles && !diagrams) {
            Self::all()
        } else {
            Self { cycles, diagrams }
        }
    }
}

/// Outcome of a full run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub aggregation: Aggregation,
    /// `None` when the cycle stage did not run
    pub cycles: Option<Vec<Cycle>>,
    pub written: Vec<PathBuf>,
}

impl PipelineReport {
    pub fn is_partial(&self) -> bool {
        self.aggregation.is_partial()
    }
}

/// Discovery → walk/merge → cycles → export, in-process
pub struct Pipeline {
    aggregator: Aggregator,
    artifacts: Artifacts,
    stages: StageSelection,
    format: DiagramFormat,
    dedupe_cycles: bool,
}

impl Pipeline {
    pub fn new(aggregator: Aggregator, artifacts: Artifacts) -> Self {
        Self {
            aggregator,
            artifacts,
            stages: StageSelection::all(),
            format: DiagramFormat::default(),
            dedupe_cycles: false,
        }
    }

    pub fn with_stages(mut self, stages: StageSelection) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_format(mut self, format: DiagramFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_dedupe_cycles(mut self, dedupe: bool) -> Self {
        self.dedupe_cycles = dedupe;
        self
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn run(&self, root: &Path, progress: Option<&Sender<ProgressMessage>>) -> Result<PipelineReport> {
        let report = |msg: ProgressMessage| {
            if let Some(tx) = progress {
                let _ = tx.send(msg);
            }
        };

        let aggregation = self.aggregator.run(root, progress)?;
        let mut written = vec![write_graph(&self.artifacts, &aggregation)?];

        let cycles = if self.stages.cycles {
            report(ProgressMessage::Started {
                phase: ProgressPhase::Cycles,
                total: aggregation.call_graph.node_count(),
            });
            let cycles = detect_cycles(&aggregation.call_graph, self.dedupe_cycles);
            written.push(write_cycles(&self.artifacts, &cycles)?);
            report(ProgressMessage::Finished {
                phase: ProgressPhase::Cycles,
            });
            info!("Found {} cycles", cycles.len());
            Some(cycles)
        } else {
            None
        };

        if self.stages.diagrams {
            report(ProgressMessage::Started {
                phase: ProgressPhase::Export,
                total: 0,
            });
            let diagrams = GraphExporter::new(self.format).export(
                &aggregation.call_graph,
                Some(&aggregation.import_graph),
                cycles.as_deref().unwrap_or_default(),
            );
            written.extend(write_diagrams(&self.artifacts, self.format, &diagrams)?);
            report(ProgressMessage::Finished {
                phase: ProgressPhase::Export,
            });
        }

        Ok(PipelineReport {
            aggregation,
            cycles,
            written,
        })
    }
}
