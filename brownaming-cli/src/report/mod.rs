//! Output files written once the walk is over
//!
//! For an input `proteins.fasta` the run directory receives
//! `proteins_brownamed.fasta`, `proteins_results.csv` (best hit per protein),
//! `proteins_top3.csv` (every retained hit) and `proteins_stats.csv`.

mod names;
mod summary;

pub use names::{TitleParser, UNCHARACTERIZED};
pub use summary::step_table;

use anyhow::{Context, Result};
use brownaming_bio::{write_fasta, Sequence, TaxonomyIndex};
use brownaming_search::{HitRecord, QueryOutcome, RunState};
use std::path::{Path, PathBuf};

pub const HIT_COLUMNS: [&str; 16] = [
    "Query accession",
    "Subject accession",
    "Subject description",
    "Subject species (taxid)",
    "Subject species (name)",
    "Gene Name",
    "Bitscore",
    "Evalue",
    "Identity (%)",
    "Similarity (%)",
    "Query coverage (%)",
    "Subject coverage (%)",
    "Common ancestor (rank)",
    "Common ancestor (taxID)",
    "Common ancestor (name)",
    "Hit found",
];

pub const STAT_COLUMNS: [&str; 12] = [
    "Step",
    "Taxon (taxID)",
    "Taxon (name)",
    "Rank",
    "Database size",
    "Estimated runtime (min)",
    "Submitted proteins",
    "Proteins with hit",
    "Proteins with hit (%)",
    "Newly resolved",
    "Search run",
    "Elapsed time (min)",
];

/// Input file name without its FASTA extension (and `.gz`)
pub fn output_stem(proteins: &Path) -> String {
    let name = proteins
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "proteins".to_string());
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    for ext in [".fasta", ".faa", ".fa"] {
        if let Some(stem) = name.strip_suffix(ext) {
            return stem.to_string();
        }
    }
    name.to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportPaths {
    pub fasta: PathBuf,
    pub results: PathBuf,
    pub top3: PathBuf,
    pub stats: PathBuf,
}

impl ReportPaths {
    pub fn new(dir: &Path, proteins: &Path) -> Self {
        let stem = output_stem(proteins);
        Self {
            fasta: dir.join(format!("{}_brownamed.fasta", stem)),
            results: dir.join(format!("{}_results.csv", stem)),
            top3: dir.join(format!("{}_top3.csv", stem)),
            stats: dir.join(format!("{}_stats.csv", stem)),
        }
    }
}

pub struct ReportGenerator<'a> {
    taxonomy: &'a TaxonomyIndex,
    state: &'a RunState,
    titles: TitleParser,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(taxonomy: &'a TaxonomyIndex, state: &'a RunState) -> Result<Self> {
        Ok(Self {
            taxonomy,
            state,
            titles: TitleParser::new()?,
        })
    }

    /// Write all four files into `dir`
    pub fn write_all(&self, dir: &Path, queries: &[Sequence]) -> Result<ReportPaths> {
        let paths = ReportPaths::new(dir, &self.state.parameters.proteins);
        self.write_renamed_fasta(&paths.fasta, queries)?;
        self.write_hits(&paths.results, true)?;
        self.write_hits(&paths.top3, false)?;
        self.write_statistics(&paths.stats)?;
        tracing::info!("Reports written to {}", dir.display());
        Ok(paths)
    }

    fn species_name(&self, hit: &HitRecord) -> &str {
        hit.subject_taxon
            .map(|taxon| self.taxonomy.name(taxon))
            .unwrap_or("")
    }

    /// Every input record, upper-cased, renamed after its best hit
    pub fn write_renamed_fasta(&self, path: &Path, queries: &[Sequence]) -> Result<()> {
        let renamed: Vec<Sequence> = queries
            .iter()
            .map(|query| {
                let description = match self.state.outcome(&query.id) {
                    QueryOutcome::Hit(set) => {
                        let best = set.best();
                        self.titles.renamed_description(
                            best.map(|h| h.subject_title.as_str()),
                            best.map_or("", |h| self.species_name(h)),
                        )
                    }
                    QueryOutcome::NoHit => UNCHARACTERIZED.to_string(),
                };
                query.renamed(description)
            })
            .collect();
        write_fasta(path, &renamed)?;
        Ok(())
    }

    fn hit_record(&self, hit: &HitRecord) -> Vec<String> {
        vec![
            hit.query_id.clone(),
            hit.subject_id.clone(),
            hit.subject_title.clone(),
            hit.subject_taxon.map(|t| t.to_string()).unwrap_or_default(),
            self.species_name(hit).to_string(),
            self.titles
                .gene_name(&hit.subject_title)
                .unwrap_or("")
                .to_string(),
            format!("{:.1}", hit.bitscore),
            format!("{:.1e}", hit.evalue),
            format!("{:.2}", hit.identity),
            format!("{:.2}", hit.positives),
            format!("{:.2}", hit.query_coverage() * 100.0),
            format!("{:.2}", hit.subject_coverage() * 100.0),
            hit.ancestor.rank.clone(),
            hit.ancestor.taxon.to_string(),
            hit.ancestor.name.clone(),
            "True".to_string(),
        ]
    }

    fn no_hit_record(query_id: &str) -> Vec<String> {
        let mut record = vec![String::new(); HIT_COLUMNS.len()];
        record[0] = query_id.to_string();
        record[HIT_COLUMNS.len() - 1] = "False".to_string();
        record
    }

    /// One row per query in input order: its best hit only, or all retained hits
    pub fn write_hits(&self, path: &Path, best_only: bool) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Could not create {}", path.display()))?;
        writer.write_record(HIT_COLUMNS)?;

        for (query_id, outcome) in self.state.outcomes() {
            match outcome {
                QueryOutcome::Hit(set) if best_only => {
                    if let Some(best) = set.best() {
                        writer.write_record(self.hit_record(best))?;
                    }
                }
                QueryOutcome::Hit(set) => {
                    for hit in set.iter() {
                        writer.write_record(self.hit_record(hit))?;
                    }
                }
                QueryOutcome::NoHit => writer.write_record(Self::no_hit_record(query_id))?,
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Step series preceded by a step-0 baseline row
    pub fn write_statistics(&self, path: &Path) -> Result<()> {
        let total = self.state.query_ids.len();
        let percent = |n: usize| {
            if total == 0 {
                0.0
            } else {
                100.0 * n as f64 / total as f64
            }
        };

        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Could not create {}", path.display()))?;
        writer.write_record(STAT_COLUMNS)?;
        writer.write_record([
            "0".to_string(),
            String::new(),
            String::new(),
            String::new(),
            "0".to_string(),
            "0.00".to_string(),
            total.to_string(),
            "0".to_string(),
            "0.0".to_string(),
            "0".to_string(),
            "False".to_string(),
            "0.00".to_string(),
        ])?;

        for stats in &self.state.statistics {
            writer.write_record([
                stats.step.to_string(),
                stats.taxon.to_string(),
                stats.taxon_name.clone(),
                stats.rank.clone(),
                stats.dbsize.to_string(),
                format!("{:.2}", stats.estimated_minutes),
                stats.queries_submitted.to_string(),
                stats.queries_with_hit.to_string(),
                format!("{:.1}", percent(stats.queries_with_hit)),
                stats.newly_resolved.to_string(),
                if stats.aligner_ran { "True" } else { "False" }.to_string(),
                format!("{:.2}", stats.elapsed_minutes),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}
