//! Optional YAML configuration.
//!
//! Every field has a default, so running without a config file behaves exactly
//! like an empty one. Command-line flags take precedence over the file.
//!
//! ```yaml
//! output_dir: /home/me/Research
//! workers: 5
//! search_endpoint: https://html.duckduckgo.com/html/
//! ```

use crate::outputs::default_output_dir;
use crate::pipeline::DEFAULT_WORKERS;
use crate::search::DEFAULT_SEARCH_ENDPOINT;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where documents are saved; the desktop research folder when unset.
    pub output_dir: Option<PathBuf>,
    /// Concurrent workers per pipeline phase.
    pub workers: usize,
    pub search_endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            workers: DEFAULT_WORKERS,
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Apply command-line overrides.
    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        if output_dir.is_some() {
            self.output_dir = output_dir;
        }
        self
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_output_dir)
    }

    pub fn workers(&self) -> usize {
        self.workers.max(1)
    }
}

/// Load the config file at `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = Config::from_yaml(&yaml).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(?config, "Loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.workers(), 5);
        assert_eq!(config.search_endpoint, DEFAULT_SEARCH_ENDPOINT);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = Config::from_yaml("workers: 3\n").unwrap();
        assert_eq!(config.workers(), 3);
        assert_eq!(config.output_dir, None);
        assert_eq!(config.search_endpoint, DEFAULT_SEARCH_ENDPOINT);
    }

    #[test]
    fn test_zero_workers_is_clamped() {
        let config = Config::from_yaml("workers: 0").unwrap();
        assert_eq!(config.workers(), 1);
    }

    #[test]
    fn test_cli_override_wins() {
        let config = Config::from_yaml("output_dir: /from/file").unwrap();
        assert_eq!(config.output_dir(), PathBuf::from("/from/file"));

        let overridden = config.clone().with_output_dir(Some(PathBuf::from("/from/cli")));
        assert_eq!(overridden.output_dir(), PathBuf::from("/from/cli"));

        let untouched = config.with_output_dir(None);
        assert_eq!(untouched.output_dir(), PathBuf::from("/from/file"));
    }

    #[test]
    fn test_load_config_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(matches!(load_config(&missing), Err(ConfigError::Read { .. })));

        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "workers: [not, a, number]").unwrap();
        assert!(matches!(load_config(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_config_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "output_dir: ./out\nworkers: 2\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.output_dir(), PathBuf::from("./out"));
        assert_eq!(config.workers(), 2);
    }
}
