use super::{check_walk, finish_run, load_taxonomy};
use crate::cli::output::{field, section_header};
use crate::cli::GlobalArgs;
use crate::logging::init_logging;
use brownaming_core::{brownaming_home, generate_run_id, run_dir, TaxonId, VERSION};
use brownaming_search::estimator::TIME_MODEL_FILE;
use brownaming_search::{
    CheckpointManager, RunParameters, RunState, RuntimeEstimator, SearchOrchestrator,
};
use brownaming_tools::{Aligner, DiamondAligner};
use clap::Args;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Protein FASTA file to name
    #[arg(short, long, value_name = "FASTA")]
    pub proteins: PathBuf,

    /// Taxonomy ID of the species the proteins come from
    #[arg(short, long, value_name = "TAXID")]
    pub species: TaxonId,

    /// DIAMOND threads (0 = all available, default from the config)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Stop the walk after searching this ancestor
    #[arg(long, value_name = "TAXID")]
    pub last_tax: Option<TaxonId>,

    /// Exclude this taxon and its descendants from the subjects (repeatable)
    #[arg(long, value_name = "TAXID")]
    pub ex_tax: Vec<TaxonId>,

    /// Search Swiss-Prot only instead of all of UniProt
    #[arg(long)]
    pub swissprot_only: bool,

    /// Run identifier (default: YYYY-MM-DD-HH-MM-<taxid>)
    #[arg(long)]
    pub run_id: Option<String>,
}

pub fn run(args: RunArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let config = global.load_config()?;
    let local_db = global.local_db(&config)?;

    let run_id = args
        .run_id
        .clone()
        .unwrap_or_else(|| generate_run_id(args.species));
    let run_dir = run_dir(&global.runs_dir(&config), &run_id);
    fs::create_dir_all(&run_dir)?;
    let _guard = init_logging(global.verbose, Some((run_dir.as_path(), run_id.as_str())))?;
    tracing::info!("Brownaming {}: starting run {} in {}", VERSION, run_id, run_dir.display());

    let taxonomy = load_taxonomy(&local_db)?;
    check_walk(&taxonomy, args.species, args.last_tax)?;

    let mut parameters = RunParameters::new(args.proteins.clone(), args.species, local_db.clone());
    parameters.last_tax = args.last_tax;
    parameters.ex_tax = args.ex_tax.clone();
    parameters.swissprot_only = args.swissprot_only;
    parameters.search = config.search.clone();
    if let Some(threads) = args.threads {
        parameters.search.threads = threads;
    }
    parameters.thresholds = config.thresholds.clone();

    let aligner = DiamondAligner::new()?.with_temp_dir(&run_dir);
    match aligner.version() {
        Ok(version) => tracing::info!("Using {} ({})", version, aligner.binary_path().display()),
        Err(e) => tracing::warn!("Could not query the DIAMOND version: {}", e),
    }
    let checkpoint = CheckpointManager::new(&run_dir, config.checkpoint.interval())?;
    checkpoint.save_parameters(&parameters)?;
    let mut orchestrator = SearchOrchestrator::new(&taxonomy, aligner, checkpoint, &parameters)?;

    let model = brownaming_home().join(TIME_MODEL_FILE);
    let plan = RuntimeEstimator::from_local_db(&taxonomy, &local_db, Some(model.as_path()))?.estimate(
        orchestrator.queries().len(),
        args.species,
        args.last_tax,
        args.swissprot_only,
    );

    section_header(&format!("Brownaming run {}", run_id));
    field("Proteins", &format!("{} ({})", args.proteins.display(), orchestrator.queries().len()));
    field(
        "Species",
        &format!("{} ({})", taxonomy.name(args.species), args.species),
    );
    field("Estimated runtime", &format!("{} (hh:mm)", plan.total_hhmm()));

    let state = RunState::new(run_id, parameters, orchestrator.query_ids(), plan);
    let state = orchestrator.run(state)?;
    finish_run(&state, orchestrator.queries(), &taxonomy, &run_dir)
}
