use crate::cli::output::{field, info, section_header, success};
use crate::cli::GlobalArgs;
use crate::logging::init_logging;
use anyhow::Context;
use brownaming_core::brownaming_home;
use brownaming_search::estimator::{LinearTimeModel, TIME_MODEL_FILE};
use brownaming_search::LogScanner;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ModelArgs {
    #[command(subcommand)]
    pub command: ModelCommand,
}

#[derive(Subcommand, Debug)]
pub enum ModelCommand {
    /// Fit the runtime model on the step timings of past run logs
    Train {
        /// Where to write the model (default: $BROWNAMING_HOME/time_model.json)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

pub fn run(args: ModelArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let _guard = init_logging(global.verbose, None)?;
    let config = global.load_config()?;

    match args.command {
        ModelCommand::Train { output } => {
            let runs_dir = global.runs_dir(&config);
            let scanner = LogScanner::new().context("Could not compile the log patterns")?;
            let (logs, samples) = scanner.scan_runs(&runs_dir)?;
            info(&format!(
                "{} timing samples from {} run logs in {}",
                samples.len(),
                logs.len(),
                runs_dir.display()
            ));

            let fit = LinearTimeModel::fit(&samples)?;
            let output = output.unwrap_or_else(|| brownaming_home().join(TIME_MODEL_FILE));
            fit.model.save(&output)?;

            section_header("Runtime model");
            field(
                "Formula",
                &format!(
                    "minutes = {:.4} + {:.6} * queries + {:.3e} * dbsize",
                    fit.model.intercept, fit.model.query_coefficient, fit.model.dbsize_coefficient
                ),
            );
            field("R²", &format!("{:.4}", fit.r2));
            field("MAE", &format!("{:.4} minutes", fit.mae));
            success(&format!("Model saved to {}", output.display()));
        }
    }
    Ok(())
}
