pub mod estimate;
pub mod model;
pub mod resume;
pub mod run;
pub mod taxonomy;

use crate::cli::output::{field, section_header, success, warning};
use crate::report::{step_table, ReportGenerator};
use anyhow::Result;
use brownaming_bio::{Sequence, TaxonomyIndex};
use brownaming_core::{BrownamingError, TaxonId};
use brownaming_search::RunState;
use std::path::Path;

/// Lookup tables of `<local_db>/taxonomy`
pub fn load_taxonomy(local_db: &Path) -> Result<TaxonomyIndex> {
    let taxonomy = TaxonomyIndex::load(local_db.join("taxonomy"))?;
    tracing::debug!(taxa = taxonomy.taxa_count(), "Taxonomy loaded");
    Ok(taxonomy)
}

/// The target must be known and the stop taxon must lie on its lineage
pub fn check_walk(
    taxonomy: &TaxonomyIndex,
    species: TaxonId,
    last_tax: Option<TaxonId>,
) -> Result<()> {
    if !taxonomy.contains(species) {
        return Err(BrownamingError::InvalidInput(format!(
            "Taxon {} is not in the taxonomy tables",
            species
        ))
        .into());
    }
    if let Some(last) = last_tax {
        if !taxonomy.lineage(species).contains(&last) {
            return Err(BrownamingError::InvalidInput(format!(
                "--last-tax {} is not an ancestor of {}",
                last, species
            ))
            .into());
        }
    }
    Ok(())
}

/// Write the reports and print the step summary
pub fn finish_run(
    state: &RunState,
    queries: &[Sequence],
    taxonomy: &TaxonomyIndex,
    run_dir: &Path,
) -> Result<()> {
    let paths = ReportGenerator::new(taxonomy, state)?.write_all(run_dir, queries)?;

    section_header("Search steps");
    println!("{}", step_table(state));

    section_header("Results");
    field("Run", &state.run_id);
    field(
        "With a hit",
        &format!("{} of {}", state.assigned.len(), state.query_ids.len()),
    );
    field("Elapsed", &format!("{:.2} minutes", state.elapsed_minutes()));
    field("Renamed FASTA", &paths.fasta.display().to_string());
    field("Best hits", &paths.results.display().to_string());
    field("Top 3 hits", &paths.top3.display().to_string());
    field("Statistics", &paths.stats.display().to_string());

    if !state.pending.is_empty() {
        warning(&format!(
            "{} proteins have fewer than 3 satisfying hits",
            state.pending.len()
        ));
    }
    success("Search complete");
    Ok(())
}
