use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use anyhow::Context;
use crate::export::DiagramFormat;
use crate::scope::DEFAULT_MAX_DEPTH;

/// Contents of `callmap.toml`; every key is optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallmapConfig {
    /// Directory receiving `call_graph.json`, `cycles.json` and `diagrams/`
    pub output_dir: PathBuf,
    /// Gitignore-style patterns skipped during discovery
    pub exclude: Vec<String>,
    /// Honour `.gitignore` / `.ignore` files and skip hidden entries
    pub respect_ignore: bool,
    /// Worker threads; defaults to the available parallelism
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    pub max_depth: usize,
    pub format: DiagramFormat,
    pub dedupe_cycles: bool,
}

impl Default for CallmapConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            exclude: Vec::new(),
            respect_ignore: false,
            workers: None,
            max_depth: DEFAULT_MAX_DEPTH,
            format: DiagramFormat::default(),
            dedupe_cycles: false,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("callmap.toml")
}

/// Load the config file.
///
/// A missing default file yields the defaults; a missing file that was
/// asked for explicitly is an error.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<CallmapConfig> {
    let explicit = path.is_some();
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        if explicit {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Ok(CallmapConfig::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: CallmapConfig = toml::from_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn write_config(path: &Path, config: &CallmapConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("callmap.toml");
        let config = CallmapConfig {
            exclude: vec!["vendor/".into()],
            workers: Some(2),
            format: DiagramFormat::Dot,
            ..Default::default()
        };

        write_config(&path, &config, false).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("callmap.toml");
        std::fs::write(&path, "dedupe_cycles = true\nformat = \"dot\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(config.dedupe_cycles);
        assert_eq!(config.format, DiagramFormat::Dot);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();

        assert!(load_config(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_write_refuses_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("callmap.toml");
        std::fs::write(&path, "").unwrap();

        assert!(write_config(&path, &CallmapConfig::default(), false).is_err());
        assert!(write_config(&path, &CallmapConfig::default(), true).is_ok());
    }
}
