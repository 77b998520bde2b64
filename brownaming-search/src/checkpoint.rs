//! Checkpointing of the run state for resumable searches
//!
//! Two files live in the run directory: `state_args.json` holds the run
//! parameters and is written once at start, `state.json` holds the full
//! `RunState` and is rewritten whenever the elapsed run time crosses the next
//! multiple of the checkpoint interval. Both are removed when the run finishes.

use crate::state::{RunParameters, RunState};
use brownaming_core::{BrownamingError, BrownamingResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const STATE_FILE: &str = "state.json";
pub const PARAMETERS_FILE: &str = "state_args.json";

pub struct CheckpointManager {
    run_dir: PathBuf,
    interval: Duration,
    next_save: Duration,
}

/// First multiple of `interval` strictly above `elapsed`
fn next_threshold(elapsed: Duration, interval: Duration) -> Duration {
    if interval.is_zero() {
        return Duration::ZERO;
    }
    let crossed = (elapsed.as_secs_f64() / interval.as_secs_f64()).floor() as u32;
    interval * (crossed + 1)
}

fn write_atomic<T: Serialize>(path: &Path, value: &T) -> BrownamingResult<()> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(fs::File::create(&tmp)?);
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn read_checkpoint<T: DeserializeOwned>(path: &Path) -> BrownamingResult<T> {
    let contents = fs::read_to_string(path).map_err(|e| {
        BrownamingError::Checkpoint(format!("Could not read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        BrownamingError::Checkpoint(format!("{} is corrupt: {}", path.display(), e))
    })
}

impl CheckpointManager {
    /// Manager for a new run; creates the run directory
    pub fn new(run_dir: &Path, interval: Duration) -> BrownamingResult<Self> {
        fs::create_dir_all(run_dir)?;
        Ok(Self {
            run_dir: run_dir.to_path_buf(),
            interval,
            next_save: interval,
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn state_path(&self) -> PathBuf {
        self.run_dir.join(STATE_FILE)
    }

    pub fn parameters_path(&self) -> PathBuf {
        self.run_dir.join(PARAMETERS_FILE)
    }

    pub fn next_save(&self) -> Duration {
        self.next_save
    }

    pub fn save_parameters(&self, parameters: &RunParameters) -> BrownamingResult<()> {
        let path = self.parameters_path();
        let mut writer = BufWriter::new(fs::File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, parameters)?;
        writer.flush()?;
        Ok(())
    }

    /// Write `state` unconditionally
    pub fn save(&self, state: &RunState) -> BrownamingResult<()> {
        write_atomic(&self.state_path(), state)?;
        tracing::info!(
            "State saved at elapsed time: {:.2} minutes",
            state.elapsed_minutes()
        );
        Ok(())
    }

    /// Save when `elapsed` has reached the next threshold. Returns whether a save happened.
    pub fn maybe_checkpoint(&mut self, state: &RunState, elapsed: Duration) -> BrownamingResult<bool> {
        if elapsed < self.next_save {
            return Ok(false);
        }
        self.save(state)?;
        self.next_save = next_threshold(elapsed, self.interval);
        Ok(true)
    }

    /// Load the parameters and state of an interrupted run
    pub fn resume(run_dir: &Path, interval: Duration) -> BrownamingResult<(Self, RunState)> {
        if !run_dir.is_dir() {
            return Err(BrownamingError::Checkpoint(format!(
                "Run directory not found: {}",
                run_dir.display()
            )));
        }

        let parameters: RunParameters = read_checkpoint(&run_dir.join(PARAMETERS_FILE))?;
        let state: RunState = read_checkpoint(&run_dir.join(STATE_FILE))?;
        if state.parameters != parameters {
            tracing::warn!(
                "{} differs from the parameters stored in {}, using the latter",
                PARAMETERS_FILE,
                STATE_FILE
            );
        }
        let elapsed = Duration::from_secs_f64(state.elapsed_secs.max(0.0));
        tracing::info!(
            "Loaded state from elapsed time: {:.2} minutes",
            state.elapsed_minutes()
        );

        let manager = Self {
            run_dir: run_dir.to_path_buf(),
            interval,
            next_save: next_threshold(elapsed, interval),
        };
        Ok((manager, state))
    }

    /// Remove both checkpoint files after a successful run
    pub fn finish(&self) -> BrownamingResult<()> {
        for path in [self.state_path(), self.parameters_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
