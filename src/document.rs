//! Persisted artifacts: the graph document and the cycle list
//!
//! Both are pretty-printed JSON with a trailing newline. Readers validate
//! the schema and report violations as [`Error::MalformedDocument`].

use std::path::Path;
use serde::Serialize;
use crate::{Error, Result};
use crate::cycles::Cycle;
use crate::graph::GraphDocument;

pub const GRAPH_FILE: &str = "call_graph.json";
pub const CYCLES_FILE: &str = "cycles.json";

/// Stage that produces the graph document
pub const GRAPH_STAGE: &str = "graph";
/// Stage that produces the cycle list
pub const CYCLES_STAGE: &str = "cycles";

/// Pretty JSON (two-space indent) with a trailing newline
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

/// Write `value` to `path`, creating parent directories
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, to_pretty_json(value)?)?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

fn read_artifact(path: &Path, stage: &'static str) -> Result<String> {
    if !path.exists() {
        return Err(Error::MissingArtifact {
            path: path.to_path_buf(),
            stage,
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

fn malformed(path: &Path, reason: impl ToString) -> Error {
    Error::MalformedDocument {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

pub fn read_graph_document(path: &Path) -> Result<GraphDocument> {
    let contents = read_artifact(path, GRAPH_STAGE)?;
    serde_json::from_str(&contents).map_err(|e| malformed(path, e))
}

pub fn read_cycles(path: &Path) -> Result<Vec<Cycle>> {
    let contents = read_artifact(path, CYCLES_STAGE)?;
    let cycles: Vec<Cycle> = serde_json::from_str(&contents).map_err(|e| malformed(path, e))?;
    validate_cycles(&cycles).map_err(|reason| malformed(path, reason))?;
    Ok(cycles)
}

/// Every cycle must close on itself and visit at least one edge
pub fn validate_cycles(cycles: &[Cycle]) -> std::result::Result<(), String> {
    for (index, cycle) in cycles.iter().enumerate() {
        if cycle.len() < 2 {
            return Err(format!("cycle {} has fewer than two elements", index));
        }
        if cycle.first() != cycle.last() {
            return Err(format!("cycle {} does not end where it starts", index));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DependencyGraph;
    use tempfile::TempDir;

    #[test]
    fn test_graph_document_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(GRAPH_FILE);
        let calls: DependencyGraph = [("app.main", "app.run")].into_iter().collect();
        let doc = GraphDocument::new(&calls, &DependencyGraph::new());

        write_json(&path, &doc).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"call_graph\": {\n    \"app.main\": [\n      \"app.run\"\n    ]\n  },\n  \"import_graph\": {}\n}\n"
        );
        assert_eq!(read_graph_document(&path).unwrap(), doc);
    }

    #[test]
    fn test_missing_graph_is_missing_artifact() {
        let dir = TempDir::new().unwrap();

        let err = read_graph_document(&dir.path().join(GRAPH_FILE)).unwrap_err();
        assert!(matches!(err, Error::MissingArtifact { stage: GRAPH_STAGE, .. }));
    }

    #[test]
    fn test_schema_violations_are_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(GRAPH_FILE);

        for body in ["{not json", r#"{"import_graph": {}}"#, r#"{"call_graph": {"a": [1]}}"#] {
            std::fs::write(&path, body).unwrap();
            let err = read_graph_document(&path).unwrap_err();
            assert!(matches!(err, Error::MalformedDocument { .. }), "accepted {}", body);
        }
    }

    #[test]
    fn test_cycles_round_trip_and_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CYCLES_FILE);
        let cycles = vec![vec!["a".to_string(), "b".into(), "a".into()]];

        write_json(&path, &cycles).unwrap();
        assert_eq!(read_cycles(&path).unwrap(), cycles);

        std::fs::write(&path, r#"[["a", "b"]]"#).unwrap();
        let err = read_cycles(&path).unwrap_err();
        assert!(err.to_string().contains("does not end where it starts"));

        std::fs::write(&path, r#"[["a"]]"#).unwrap();
        assert!(matches!(read_cycles(&path).unwrap_err(), Error::MalformedDocument { .. }));
    }

    #[test]
    fn test_empty_cycle_list_is_valid() {
        assert!(validate_cycles(&[]).is_ok());
    }
}
