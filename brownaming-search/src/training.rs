//! Fitting the runtime model from past run logs
//!
//! Every run log holds one `Step N: Searching among <dbsize> sequences ... with
//! <n> pending sequences` line per step followed by a cumulative
//! `Elapsed time: <m> minutes` line. Consecutive elapsed values give the
//! minutes spent in each step, which are regressed on (pending, dbsize).

use crate::estimator::{LinearTimeModel, RuntimePredictor};
use brownaming_core::{BrownamingError, BrownamingResult};
use regex::Regex;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Fewer samples than this cannot determine intercept and two coefficients
pub const MIN_SAMPLES: usize = 3;

/// One searched step: pending queries, incremental database size, minutes spent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSample {
    pub queries: usize,
    pub dbsize: u64,
    pub minutes: f64,
}

/// Extracts timing samples from log text, whatever prefix the log formatter adds
pub struct LogScanner {
    step: Regex,
    elapsed: Regex,
}

impl LogScanner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            step: Regex::new(
                r"Step \d+: Searching among (\d+) sequences .* with (\d+) pending sequences",
            )?,
            elapsed: Regex::new(r"Elapsed time: ([0-9]+(?:\.[0-9]+)?) minutes")?,
        })
    }

    /// Samples of one log. Steps that searched nothing (empty scope, zero size) still
    /// advance the clock but yield no sample, and so do negative deltas.
    pub fn scan<R: BufRead>(&self, reader: R) -> BrownamingResult<Vec<TimingSample>> {
        let mut samples = Vec::new();
        let mut current: Option<(usize, u64)> = None;
        let mut last_elapsed = 0.0;

        for line in reader.lines() {
            let line = line?;
            if let Some(caps) = self.step.captures(&line) {
                let dbsize = caps[1].parse::<u64>().ok();
                let queries = caps[2].parse::<usize>().ok();
                current = dbsize.zip(queries).map(|(d, q)| (q, d));
                continue;
            }

            let elapsed = match self
                .elapsed
                .captures(&line)
                .and_then(|caps| caps[1].parse::<f64>().ok())
            {
                Some(elapsed) => elapsed,
                None => continue,
            };
            if let Some((queries, dbsize)) = current.take() {
                let minutes = elapsed - last_elapsed;
                if queries > 0 && dbsize > 0 && minutes >= 0.0 {
                    samples.push(TimingSample {
                        queries,
                        dbsize,
                        minutes,
                    });
                }
            }
            last_elapsed = elapsed;
        }

        Ok(samples)
    }

    /// Samples from every `<runs_dir>/*/*.log`
    pub fn scan_runs(&self, runs_dir: &Path) -> BrownamingResult<(Vec<PathBuf>, Vec<TimingSample>)> {
        let pattern = runs_dir.join("*").join("*.log");
        let pattern = pattern.to_string_lossy();
        let paths = glob::glob(&pattern)
            .map_err(|e| BrownamingError::InvalidInput(format!("Bad log pattern {}: {}", pattern, e)))?;

        let mut logs = Vec::new();
        let mut samples = Vec::new();
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("Skipping unreadable run log: {}", e);
                    continue;
                }
            };
            let found = self.scan(BufReader::new(File::open(&path)?))?;
            tracing::debug!(path = %path.display(), samples = found.len(), "Scanned run log");
            samples.extend(found);
            logs.push(path);
        }
        Ok((logs, samples))
    }
}

/// A fitted model with its in-sample quality
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFit {
    pub model: LinearTimeModel,
    pub samples: usize,
    pub r2: f64,
    pub mae: f64,
}

impl LinearTimeModel {
    /// Ordinary least squares of minutes on pending queries and database size.
    ///
    /// Features are centered, the 2x2 normal equations are solved directly and the
    /// intercept is recovered from the means. Too few samples or collinear
    /// features are `InvalidInput`.
    pub fn fit(samples: &[TimingSample]) -> BrownamingResult<ModelFit> {
        if samples.len() < MIN_SAMPLES {
            return Err(BrownamingError::InvalidInput(format!(
                "{} timing samples, at least {} are needed",
                samples.len(),
                MIN_SAMPLES
            )));
        }

        let n = samples.len() as f64;
        let mean_q = samples.iter().map(|s| s.queries as f64).sum::<f64>() / n;
        let mean_d = samples.iter().map(|s| s.dbsize as f64).sum::<f64>() / n;
        let mean_y = samples.iter().map(|s| s.minutes).sum::<f64>() / n;

        let (mut sqq, mut sqd, mut sdd, mut sqy, mut sdy) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for s in samples {
            let q = s.queries as f64 - mean_q;
            let d = s.dbsize as f64 - mean_d;
            let y = s.minutes - mean_y;
            sqq += q * q;
            sqd += q * d;
            sdd += d * d;
            sqy += q * y;
            sdy += d * y;
        }

        let det = sqq * sdd - sqd * sqd;
        if sqq == 0.0 || sdd == 0.0 || det <= 1e-12 * sqq * sdd {
            return Err(BrownamingError::InvalidInput(
                "Timing samples do not vary independently in queries and database size".to_string(),
            ));
        }

        let query_coefficient = (sqy * sdd - sdy * sqd) / det;
        let dbsize_coefficient = (sdy * sqq - sqy * sqd) / det;
        let model = LinearTimeModel {
            intercept: mean_y - query_coefficient * mean_q - dbsize_coefficient * mean_d,
            query_coefficient,
            dbsize_coefficient,
        };

        let (mut ss_res, mut ss_tot, mut abs_err) = (0.0, 0.0, 0.0);
        for s in samples {
            let residual = s.minutes - model.predict_minutes(s.queries, s.dbsize);
            ss_res += residual * residual;
            ss_tot += (s.minutes - mean_y).powi(2);
            abs_err += residual.abs();
        }
        let r2 = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };

        Ok(ModelFit {
            model,
            samples: samples.len(),
            r2,
            mae: abs_err / n,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> BrownamingResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
