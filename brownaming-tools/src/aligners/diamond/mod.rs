//! DIAMOND `blastp` backend

pub mod parser;

pub use parser::{parse_tabular, OUTPUT_FIELDS};

use crate::traits::{Aligner, AlignmentRow, SearchRequest};
use crate::types::Tool;
use brownaming_core::{BrownamingError, BrownamingResult};
use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Runs `diamond blastp` once per request against a prebuilt `.dmnd` database
pub struct DiamondAligner {
    binary_path: PathBuf,
    temp_dir: Option<PathBuf>,
    show_progress: bool,
}

impl DiamondAligner {
    /// Locate `diamond` on `PATH`
    pub fn new() -> BrownamingResult<Self> {
        let tool = Tool::Diamond;
        let binary_path = which::which(tool.binary_name()).map_err(|_| {
            BrownamingError::ToolNotFound(format!(
                "'{}' is not on PATH; {}",
                tool.binary_name(),
                tool.install_hint()
            ))
        })?;
        Ok(Self::with_binary(binary_path))
    }

    pub fn with_binary<P: Into<PathBuf>>(binary_path: P) -> Self {
        Self {
            binary_path: binary_path.into(),
            temp_dir: None,
            show_progress: true,
        }
    }

    /// Directory for the temporary result files (system temp dir otherwise)
    pub fn with_temp_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Arguments of one `blastp` call writing to `output`
    pub fn command_args(&self, request: &SearchRequest<'_>, output: &Path) -> Vec<OsString> {
        let options = request.options;
        let mut args: Vec<OsString> = vec![
            "blastp".into(),
            "-d".into(),
            request.database.into(),
            "-q".into(),
            request.query_fasta.into(),
            "-k".into(),
            options.max_target_seqs.to_string().into(),
            "-e".into(),
            options.evalue.to_string().into(),
            "-p".into(),
            options.threads.to_string().into(),
        ];
        if let Some(flag) = options.sensitivity_flag() {
            args.push(flag.into());
        }
        args.push("-f".into());
        args.push("6".into());
        args.extend(OUTPUT_FIELDS.iter().map(OsString::from));
        args.push("-o".into());
        args.push(output.into());
        args.push("--taxonlist".into());
        args.push(request.taxon_list_arg().into());
        args
    }

    fn spinner(&self, request: &SearchRequest<'_>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!(
            "DIAMOND blastp: {} queries against {} taxa",
            request.query_ids.len(),
            request.taxon_list.len()
        ));
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}

impl Aligner for DiamondAligner {
    fn search(&mut self, request: &SearchRequest<'_>) -> BrownamingResult<Vec<AlignmentRow>> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(".diamond_").suffix(".tsv");
        let output = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        let args = self.command_args(request, output.path());
        tracing::debug!(
            binary = %self.binary_path.display(),
            args = ?args,
            "Running DIAMOND"
        );

        let spinner = self.spinner(request);
        let result = Command::new(&self.binary_path).args(&args).output();
        spinner.finish_and_clear();

        let status = match result {
            Ok(status) => status,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BrownamingError::ToolNotFound(format!(
                    "{}: {}",
                    self.binary_path.display(),
                    e
                )))
            }
            Err(e) => return Err(e.into()),
        };

        if !status.status.success() {
            let stderr = String::from_utf8_lossy(&status.stderr);
            return Err(BrownamingError::Alignment(format!(
                "DIAMOND blastp failed with exit code {}: {}",
                status.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        // `output` is removed when it goes out of scope
        let rows = parse_tabular(BufReader::new(File::open(output.path())?))?;
        tracing::debug!(rows = rows.len(), "Parsed DIAMOND output");
        Ok(rows)
    }

    fn version(&self) -> BrownamingResult<String> {
        let output = Command::new(&self.binary_path).arg("version").output()?;
        if !output.status.success() {
            return Err(BrownamingError::Alignment(
                "`diamond version` returned a failure status".to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn is_available(&self) -> bool {
        self.binary_path.exists()
    }
}
