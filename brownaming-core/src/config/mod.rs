//! Configuration types for Brownaming

use crate::BrownamingError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Root of the local database (taxonomy tables and DIAMOND databases)
    #[serde(default)]
    pub local_db_path: Option<String>,
    /// Directory holding one sub-directory per run
    #[serde(default)]
    pub runs_dir: Option<String>,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_target_seqs")]
    pub max_target_seqs: usize,
    #[serde(default = "default_evalue")]
    pub evalue: f64,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: String,
    /// 0 = all available CPUs
    #[serde(default)]
    pub threads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default)]
    pub min_identity: f64,
    #[serde(default)]
    pub min_query_coverage: f64,
    #[serde(default)]
    pub min_subject_coverage: f64,
    #[serde(default = "default_min_bitscore")]
    pub min_bitscore: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

// Default value functions
fn default_max_target_seqs() -> usize { 50 }
fn default_evalue() -> f64 { 1e-5 }
fn default_sensitivity() -> String { "more-sensitive".to_string() }
fn default_min_bitscore() -> f64 { 50.0 }
fn default_interval_minutes() -> u64 { 15 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_target_seqs: default_max_target_seqs(),
            evalue: default_evalue(),
            sensitivity: default_sensitivity(),
            threads: 0,
        }
    }
}

impl SearchConfig {
    /// Thread count handed to the aligner
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_identity: 0.0,
            min_query_coverage: 0.0,
            min_subject_coverage: 0.0,
            min_bitscore: default_min_bitscore(),
        }
    }
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
        }
    }
}

impl CheckpointConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

impl Config {
    pub fn local_db_path(&self) -> Option<PathBuf> {
        self.local_db_path.as_ref().map(PathBuf::from)
    }

    pub fn runs_dir(&self) -> Option<PathBuf> {
        self.runs_dir.as_ref().map(PathBuf::from)
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, BrownamingError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| BrownamingError::Configuration(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

/// Load the config at `path` if it exists, defaults otherwise
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config, BrownamingError> {
    let path = path.as_ref();
    if path.exists() {
        tracing::debug!(path = %path.display(), "Loading configuration");
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), BrownamingError> {
    let contents = toml::to_string_pretty(config).map_err(|e| {
        BrownamingError::Configuration(format!("Failed to serialize config: {}", e))
    })?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.local_db_path, None);
        assert_eq!(config.runs_dir, None);

        assert_eq!(config.search.max_target_seqs, 50);
        assert_eq!(config.search.evalue, 1e-5);
        assert_eq!(config.search.sensitivity, "more-sensitive");
        assert_eq!(config.search.threads, 0);

        assert_eq!(config.thresholds.min_identity, 0.0);
        assert_eq!(config.thresholds.min_query_coverage, 0.0);
        assert_eq!(config.thresholds.min_subject_coverage, 0.0);
        assert_eq!(config.thresholds.min_bitscore, 50.0);

        assert_eq!(config.checkpoint.interval_minutes, 15);
        assert_eq!(config.checkpoint.interval(), Duration::from_secs(900));
    }

    #[test]
    fn test_load_partial_config() {
        let toml_content = r#"
local_db_path = "/data/brownaming"

[thresholds]
min_query_coverage = 0.5

[checkpoint]
interval_minutes = 5
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", toml_content).unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config.local_db_path(), Some(PathBuf::from("/data/brownaming")));
        assert_eq!(config.thresholds.min_query_coverage, 0.5);
        assert_eq!(config.checkpoint.interval_minutes, 5);

        // Defaults for unspecified fields
        assert_eq!(config.thresholds.min_bitscore, 50.0);
        assert_eq!(config.search.max_target_seqs, 50);
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "this is not valid TOML {{").unwrap();

        match load_config(temp_file.path()).unwrap_err() {
            BrownamingError::Configuration(msg) => {
                assert!(msg.contains("Failed to parse config"));
            }
            _ => panic!("Expected Configuration error"),
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        match load_config("/nonexistent/path/to/config.toml").unwrap_err() {
            BrownamingError::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_load_or_default_without_file() {
        let config = load_config_or_default("/nonexistent/brownaming.toml").unwrap();
        assert_eq!(config.search.sensitivity, "more-sensitive");
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.runs_dir = Some("/scratch/runs".to_string());
        config.search.threads = 8;
        config.thresholds.min_identity = 30.0;

        let temp_file = NamedTempFile::new().unwrap();
        save_config(temp_file.path(), &config).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.runs_dir, config.runs_dir);
        assert_eq!(loaded.search.threads, 8);
        assert_eq!(loaded.search.effective_threads(), 8);
        assert_eq!(loaded.thresholds.min_identity, 30.0);
    }
}
