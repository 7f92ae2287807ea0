use std::collections::BTreeMap;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};
use crate::aggregate::FileFailure;
use crate::graph::GraphStats;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

#[derive(Tabled)]
struct CollisionRow {
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "Files")]
    files: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &GraphStats) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Files analyzed", &stats.files.to_string());
    builder.add_row("Scopes", &stats.scopes.to_string());
    builder.add_row("Call edges", &stats.call_edges.to_string());
    builder.add_row("Importing modules", &stats.modules.to_string());
    builder.add_row("Import edges", &stats.import_edges.to_string());
    builder.build()
}

pub fn failures_table(failures: &[FileFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }

    let rows: Vec<FailureRow> = failures
        .iter()
        .map(|f| FailureRow {
            file: f.path.display().to_string(),
            reason: f.reason.clone(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn collisions_table(collisions: &BTreeMap<String, Vec<PathBuf>>) -> String {
    if collisions.is_empty() {
        return String::new();
    }

    let rows: Vec<CollisionRow> = collisions
        .iter()
        .map(|(module, paths)| CollisionRow {
            module: module.clone(),
            files: paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
