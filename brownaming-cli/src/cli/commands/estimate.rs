use super::{check_walk, load_taxonomy};
use crate::cli::output::{create_standard_table, field, header_cell, number_cell, section_header};
use crate::cli::GlobalArgs;
use crate::logging::init_logging;
use brownaming_bio::parse_fasta;
use brownaming_core::{brownaming_home, TaxonId};
use brownaming_search::estimator::TIME_MODEL_FILE;
use brownaming_search::orchestrator::next_taxon;
use brownaming_search::RuntimeEstimator;
use clap::Args;
use comfy_table::Cell;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// Protein FASTA file to name
    #[arg(short, long, value_name = "FASTA")]
    pub proteins: PathBuf,

    /// Taxonomy ID of the species the proteins come from
    #[arg(short, long, value_name = "TAXID")]
    pub species: TaxonId,

    /// Stop the walk after this ancestor
    #[arg(long, value_name = "TAXID")]
    pub last_tax: Option<TaxonId>,

    /// Estimate for Swiss-Prot only
    #[arg(long)]
    pub swissprot_only: bool,

    /// Trained time model (default: $BROWNAMING_HOME/time_model.json)
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,
}

pub fn run(args: EstimateArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let _guard = init_logging(global.verbose, None)?;
    let config = global.load_config()?;
    let local_db = global.local_db(&config)?;

    let taxonomy = load_taxonomy(&local_db)?;
    check_walk(&taxonomy, args.species, args.last_tax)?;
    let queries = parse_fasta(&args.proteins)?;

    let model = args
        .model
        .clone()
        .unwrap_or_else(|| brownaming_home().join(TIME_MODEL_FILE));
    let plan = RuntimeEstimator::from_local_db(&taxonomy, &local_db, Some(model.as_path()))?.estimate(
        queries.len(),
        args.species,
        args.last_tax,
        args.swissprot_only,
    );

    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Taxon"),
        header_cell("Rank"),
        header_cell("DB size"),
        header_cell("Minutes"),
    ]);
    let mut taxon = Some(args.species);
    let mut step = 0u32;
    while let Some(current) = taxon {
        step += 1;
        table.add_row(vec![
            number_cell(step.to_string()),
            Cell::new(format!("{} ({})", taxonomy.name(current), current)),
            Cell::new(taxonomy.rank(current)),
            number_cell(plan.dbsize_for(step).to_string()),
            number_cell(format!("{:.2}", plan.minutes_for(step))),
        ]);
        taxon = next_taxon(&taxonomy, current, args.last_tax);
    }

    section_header("Runtime estimate");
    field("Proteins", &queries.len().to_string());
    field("Database", if args.swissprot_only { "Swiss-Prot" } else { "UniProt" });
    println!("{}", table);
    field("Total", &format!("{} (hh:mm, worst case)", plan.total_hhmm()));
    Ok(())
}
