use super::{finish_run, load_taxonomy};
use crate::cli::output::info;
use crate::cli::GlobalArgs;
use crate::logging::init_logging;
use brownaming_core::{run_dir, BrownamingError};
use brownaming_search::{CheckpointManager, SearchOrchestrator};
use brownaming_tools::DiamondAligner;
use clap::Args;

#[derive(Args, Debug)]
pub struct ResumeArgs {
    /// Identifier of the interrupted run
    #[arg(value_name = "RUN_ID")]
    pub run_id: String,
}

pub fn run(args: ResumeArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let config = global.load_config()?;
    let run_dir = run_dir(&global.runs_dir(&config), &args.run_id);

    // A missing run directory is reported by the checkpoint manager
    let run_log = run_dir.is_dir().then_some((run_dir.as_path(), args.run_id.as_str()));
    let _guard = init_logging(global.verbose, run_log)?;

    let (checkpoint, state) = CheckpointManager::resume(&run_dir, config.checkpoint.interval())?;
    info(&state.summary());

    let parameters = state.parameters.clone();
    let taxonomy = load_taxonomy(&parameters.local_db)?;
    let aligner = DiamondAligner::new()?.with_temp_dir(&run_dir);
    let mut orchestrator = SearchOrchestrator::new(&taxonomy, aligner, checkpoint, &parameters)?;

    if orchestrator.query_ids() != state.query_ids {
        return Err(BrownamingError::Checkpoint(format!(
            "{} no longer holds the proteins this run started with",
            parameters.proteins.display()
        ))
        .into());
    }

    let state = orchestrator.run(state)?;
    finish_run(&state, orchestrator.queries(), &taxonomy, &run_dir)
}
