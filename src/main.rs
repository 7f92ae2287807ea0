//! Callmap CLI - call graphs, import graphs and their cycles for Python code

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use clap::{Parser, Subcommand};
use callmap::aggregate::{Aggregation, Aggregator};
use callmap::config::{self, CallmapConfig};
use callmap::cycles::Cycle;
use callmap::export::DiagramFormat;
use callmap::output::is_quiet;
use callmap::pipeline::{self, Artifacts, CycleSource, Pipeline, StageSelection};
use callmap::ui::{self, Icons};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "callmap")]
#[command(version)]
#[command(about = "Scope-aware call and import graphs for Python codebases")]
#[command(long_about = r#"
Callmap walks Python sources and builds:
  • A call graph between scopes (module.Class.function)
  • An import graph between modules
  • The cycles in the call graph
  • Cycle-highlighted Mermaid or Graphviz diagrams

Example usage:
  callmap analyze ./src
  callmap analyze ./src --cycles -o out
  callmap export --format dot
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./callmap.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on a file or directory
    Analyze {
        /// File or directory to analyze
        path: PathBuf,

        /// Detect cycles
        #[arg(long)]
        cycles: bool,

        /// Render diagrams
        #[arg(long)]
        diagrams: bool,

        /// Run every stage (the default when no stage is selected)
        #[arg(long)]
        all: bool,

        /// Output directory for artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Diagram format
        #[arg(long, value_enum)]
        format: Option<DiagramFormat>,

        /// Drop cycles that are rotations of an earlier one
        #[arg(long)]
        dedupe_cycles: bool,

        /// Worker threads
        #[arg(short, long)]
        workers: Option<usize>,

        /// Honour .gitignore/.ignore files and skip hidden entries
        #[arg(long)]
        respect_ignore: bool,
    },

    /// Build and write the graph document only
    Graph {
        /// File or directory to analyze
        path: PathBuf,

        /// Output directory for artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads
        #[arg(short, long)]
        workers: Option<usize>,

        /// Honour .gitignore/.ignore files and skip hidden entries
        #[arg(long)]
        respect_ignore: bool,
    },

    /// Detect cycles in a previously written graph document
    Cycles {
        /// Graph document (defaults to <output>/call_graph.json)
        #[arg(short, long)]
        graph: Option<PathBuf>,

        /// Output directory for artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Search the import graph instead of the call graph
        #[arg(long)]
        import_graph: bool,

        /// Drop cycles that are rotations of an earlier one
        #[arg(long)]
        dedupe_cycles: bool,
    },

    /// Render diagrams from previously written artifacts
    Export {
        /// Graph document (defaults to <output>/call_graph.json)
        #[arg(short, long)]
        graph: Option<PathBuf>,

        /// Cycle document (defaults to <output>/cycles.json when present)
        #[arg(long)]
        cycles: Option<PathBuf>,

        /// Output directory for artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Diagram format
        #[arg(long, value_enum)]
        format: Option<DiagramFormat>,
    },

    /// Write a default callmap.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

enum Outcome {
    Complete,
    Partial,
}

impl Outcome {
    fn from_partial(partial: bool) -> Self {
        if partial { Outcome::Partial } else { Outcome::Complete }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(Outcome::Complete) => ExitCode::SUCCESS,
        Ok(Outcome::Partial) => ExitCode::from(2),
        Err(e) => {
            ui::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<Outcome> {
    if let Commands::Init { force } = cli.command {
        let path = cli.config.unwrap_or_else(config::default_config_path);
        config::write_config(&path, &CallmapConfig::default(), force)?;
        if !is_quiet() {
            ui::success(&format!("Wrote {}", path.display()));
        }
        return Ok(Outcome::Complete);
    }

    let mut config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            path,
            cycles,
            diagrams,
            all,
            output,
            format,
            dedupe_cycles,
            workers,
            respect_ignore,
        } => {
            apply_overrides(&mut config, output, workers, respect_ignore);
            config.format = format.unwrap_or(config.format);
            config.dedupe_cycles |= dedupe_cycles;
            let stages = StageSelection::from_flags(cycles, diagrams, all);

            if !is_quiet() {
                ui::header(&format!("Analyzing {}", path.display()));
                ui::info("Output", &config.output_dir.display().to_string());
            }

            let start = Instant::now();
            let (progress, tx) = ui::ProgressManager::new();
            let result = Pipeline::new(aggregator(&config), Artifacts::new(&config.output_dir))
                .with_stages(stages)
                .with_format(config.format)
                .with_dedupe_cycles(config.dedupe_cycles)
                .run(&path, Some(&tx));
            drop(tx);

            let report = match result {
                Ok(report) => report,
                Err(e) => {
                    progress.clear();
                    return Err(e.into());
                }
            };

            let stats = report.aggregation.stats();
            progress.finish_with_summary(start.elapsed(), stats.files, stats.scopes, stats.call_edges);
            print_aggregation(&report.aggregation);
            if let Some(cycles) = &report.cycles {
                print_cycles(cycles);
            }
            print_written(&report.written);

            Ok(Outcome::from_partial(report.is_partial()))
        }

        Commands::Graph {
            path,
            output,
            workers,
            respect_ignore,
        } => {
            apply_overrides(&mut config, output, workers, respect_ignore);
            if !is_quiet() {
                ui::phase(&format!("Building graphs for {}", path.display()));
            }

            let start = Instant::now();
            let (progress, tx) = ui::ProgressManager::new();
            let result = aggregator(&config).run(&path, Some(&tx));
            drop(tx);
            progress.clear();
            let aggregation = result?;

            let artifacts = Artifacts::new(&config.output_dir);
            let written = pipeline::write_graph(&artifacts, &aggregation)?;

            print_aggregation(&aggregation);
            print_written(&[written]);
            print_elapsed(start);
            Ok(Outcome::from_partial(aggregation.is_partial()))
        }

        Commands::Cycles {
            graph,
            output,
            import_graph,
            dedupe_cycles,
        } => {
            apply_overrides(&mut config, output, None, false);
            config.dedupe_cycles |= dedupe_cycles;
            let artifacts = Artifacts::new(&config.output_dir);
            let graph_path = graph.unwrap_or_else(|| artifacts.graph_path());
            let source = if import_graph {
                CycleSource::ImportGraph
            } else {
                CycleSource::CallGraph
            };

            if !is_quiet() {
                ui::phase(&format!("Detecting cycles in {}", graph_path.display()));
            }

            let start = Instant::now();
            let cycles = pipeline::cycles_from_artifact(&graph_path, &artifacts, source, config.dedupe_cycles)?;

            print_cycles(&cycles);
            print_written(&[artifacts.cycles_path()]);
            print_elapsed(start);
            Ok(Outcome::Complete)
        }

        Commands::Export {
            graph,
            cycles,
            output,
            format,
        } => {
            apply_overrides(&mut config, output, None, false);
            let format = format.unwrap_or(config.format);
            let artifacts = Artifacts::new(&config.output_dir);
            let graph_path = graph.unwrap_or_else(|| artifacts.graph_path());

            if !is_quiet() {
                ui::phase(&format!("Rendering diagrams from {}", graph_path.display()));
                ui::status(Icons::STATS, "Format", format.as_str());
            }

            let start = Instant::now();
            let written = pipeline::export_from_artifacts(&graph_path, cycles.as_deref(), &artifacts, format)?;

            print_written(&written);
            print_elapsed(start);
            Ok(Outcome::Complete)
        }

        Commands::Init { .. } => Ok(Outcome::Complete),
    }
}

/// CLI flags take precedence over the config file
fn apply_overrides(config: &mut CallmapConfig, output: Option<PathBuf>, workers: Option<usize>, respect_ignore: bool) {
    if let Some(output) = output {
        config.output_dir = output;
    }
    if workers.is_some() {
        config.workers = workers;
    }
    config.respect_ignore |= respect_ignore;
}

fn aggregator(config: &CallmapConfig) -> Aggregator {
    let aggregator = Aggregator::new()
        .with_max_depth(config.max_depth)
        .with_respect_ignore(config.respect_ignore)
        .with_excludes(config.exclude.clone());

    match config.workers {
        Some(workers) => aggregator.with_workers(workers),
        None => aggregator,
    }
}

fn print_aggregation(aggregation: &Aggregation) {
    if is_quiet() {
        return;
    }

    ui::section("Dependency graph");
    println!("{}", ui::stats_table(&aggregation.stats()));

    if !aggregation.collisions.is_empty() {
        ui::warn(&format!(
            "{} module names are shared by several files; their scopes were merged",
            aggregation.collisions.len()
        ));
        println!("{}", ui::collisions_table(&aggregation.collisions));
    }

    if aggregation.is_partial() {
        ui::warn(&format!("{} files could not be analyzed", aggregation.failures.len()));
        println!("{}", ui::failures_table(&aggregation.failures));
    }
}

fn print_cycles(cycles: &[Cycle]) {
    if is_quiet() {
        return;
    }

    ui::section("Cycles");
    if cycles.is_empty() {
        ui::success("No cycles found");
        return;
    }
    for (index, cycle) in cycles.iter().enumerate() {
        ui::cycle(index, cycle);
    }
}

fn print_written(paths: &[PathBuf]) {
    if is_quiet() {
        return;
    }

    ui::section("Artifacts");
    for path in paths {
        ui::artifact(path);
    }
}

fn print_elapsed(start: Instant) {
    if !is_quiet() {
        ui::timing(&format!("{:.2?}", start.elapsed()));
    }
}
