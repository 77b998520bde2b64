pub mod commands;
pub mod output;

use brownaming_core::config::load_config_or_default;
use brownaming_core::{default_config_path, default_runs_dir, resolve_local_db, Config};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "brownaming",
    version,
    about = "Name uncharacterized proteins from their closest annotated homologs",
    long_about = "Brownaming searches DIAMOND homologs for a set of proteins, starting with the \
                  target species and climbing its taxonomy one level at a time until every \
                  protein has three satisfying hits. Runs are checkpointed and can be resumed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to $BROWNAMING_HOME/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Local database root holding taxonomy/ and diamond/
    #[arg(long, value_name = "DIR", global = true)]
    pub local_db: Option<PathBuf>,

    /// Parent directory of run directories
    #[arg(long, value_name = "DIR", global = true)]
    pub runs_dir: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let path = self.config.clone().unwrap_or_else(default_config_path);
        Ok(load_config_or_default(path)?)
    }

    pub fn local_db(&self, config: &Config) -> anyhow::Result<PathBuf> {
        Ok(resolve_local_db(self.local_db.as_deref(), config)?)
    }

    /// `--runs-dir`, then `runs_dir` from the config, then `$BROWNAMING_HOME/runs`
    pub fn runs_dir(&self, config: &Config) -> PathBuf {
        self.runs_dir
            .clone()
            .or_else(|| config.runs_dir())
            .unwrap_or_else(default_runs_dir)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new search
    Run(commands::run::RunArgs),

    /// Resume an interrupted search from its checkpoint
    Resume(commands::resume::ResumeArgs),

    /// Print the predicted runtime of a search without running it
    Estimate(commands::estimate::EstimateArgs),

    /// Build and inspect the taxonomy lookup tables
    Taxonomy(commands::taxonomy::TaxonomyArgs),

    /// Train the runtime model from past run logs
    Model(commands::model::ModelArgs),
}
