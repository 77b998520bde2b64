use crate::config::Config;
use crate::types::TaxonId;
use crate::{BrownamingError, BrownamingResult};
use std::path::{Path, PathBuf};

/// Environment variable naming the local database root
pub const LOCAL_DB_ENV: &str = "LOCAL_DB_PATH";

/// Get the Brownaming home directory
/// Checks BROWNAMING_HOME environment variable, falls back to ${HOME}/.brownaming
pub fn brownaming_home() -> PathBuf {
    if let Ok(path) = std::env::var("BROWNAMING_HOME") {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".brownaming")
}

/// Default location of the TOML configuration file
pub fn default_config_path() -> PathBuf {
    brownaming_home().join("config.toml")
}

/// Default parent directory of all run directories
pub fn default_runs_dir() -> PathBuf {
    brownaming_home().join("runs")
}

/// Directory holding the checkpoint, log and reports of one run
pub fn run_dir(runs_dir: &Path, run_id: &str) -> PathBuf {
    // A runs dir that already points at the run is used as-is
    if runs_dir.file_name().and_then(|n| n.to_str()) == Some(run_id) {
        return runs_dir.to_path_buf();
    }
    runs_dir.join(run_id)
}

/// Run identifiers look like `2024-05-17-09-42-9606` (local time, minute precision)
pub fn generate_run_id(target: TaxonId) -> String {
    format!("{}-{}", chrono::Local::now().format("%Y-%m-%d-%H-%M"), target)
}

/// Resolve the local database root.
///
/// Priority: explicit flag, then `LOCAL_DB_PATH`, then `local_db_path` from the config file.
pub fn resolve_local_db(flag: Option<&Path>, config: &Config) -> BrownamingResult<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(LOCAL_DB_ENV) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    config.local_db_path().ok_or_else(|| {
        BrownamingError::Configuration(format!(
            "Database path not found. Pass --local-db, set {} or local_db_path in {}",
            LOCAL_DB_ENV,
            default_config_path().display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_run_id_format() {
        let run_id = generate_run_id(TaxonId(9606));

        // YYYY-MM-DD-HH-MM-taxid
        assert!(run_id.ends_with("-9606"));
        let parts: Vec<&str> = run_id.split('-').collect();
        assert_eq!(parts.len(), 6);
        assert_eq!(parts[0].len(), 4);
        assert!(parts[..5].iter().all(|p| p.chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn test_run_dir_construction() {
        let dir = run_dir(Path::new("/data/runs"), "2024-01-01-10-00-9606");
        assert_eq!(dir, PathBuf::from("/data/runs/2024-01-01-10-00-9606"));

        // Already pointing at the run
        let dir = run_dir(
            Path::new("/data/runs/2024-01-01-10-00-9606"),
            "2024-01-01-10-00-9606",
        );
        assert_eq!(dir, PathBuf::from("/data/runs/2024-01-01-10-00-9606"));
    }

    #[test]
    #[serial]
    fn test_resolve_local_db_priority() {
        let mut config = Config::default();
        config.local_db_path = Some("/from/config".to_string());

        std::env::set_var(LOCAL_DB_ENV, "/from/env");
        assert_eq!(
            resolve_local_db(Some(Path::new("/from/flag")), &config).unwrap(),
            PathBuf::from("/from/flag")
        );
        assert_eq!(
            resolve_local_db(None, &config).unwrap(),
            PathBuf::from("/from/env")
        );

        std::env::remove_var(LOCAL_DB_ENV);
        assert_eq!(
            resolve_local_db(None, &config).unwrap(),
            PathBuf::from("/from/config")
        );
    }

    #[test]
    #[serial]
    fn test_resolve_local_db_missing() {
        std::env::remove_var(LOCAL_DB_ENV);
        match resolve_local_db(None, &Config::default()).unwrap_err() {
            BrownamingError::Configuration(msg) => assert!(msg.contains("Database path not found")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_home_override() {
        std::env::set_var("BROWNAMING_HOME", "/tmp/brownaming-home");
        assert_eq!(brownaming_home(), PathBuf::from("/tmp/brownaming-home"));
        assert_eq!(
            default_runs_dir(),
            PathBuf::from("/tmp/brownaming-home/runs")
        );
        std::env::remove_var("BROWNAMING_HOME");
    }
}
