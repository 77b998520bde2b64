//! Search scope construction and the bridge to the external aligner

use crate::hit::{AncestorContext, HitRecord};
use brownaming_bio::TaxonomyIndex;
use brownaming_core::{BrownamingResult, TaxonId};
use brownaming_tools::{Aligner, SearchOptions, SearchRequest};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

pub const SWISSPROT_DATABASE: &str = "uniprot_sprot.dmnd";
pub const FULL_DATABASE: &str = "uniprot_all.dmnd";

/// `<local_db>/diamond/uniprot_sprot.dmnd` or `<local_db>/diamond/uniprot_all.dmnd`
pub fn diamond_database(local_db: &Path, swissprot_only: bool) -> PathBuf {
    let file = if swissprot_only {
        SWISSPROT_DATABASE
    } else {
        FULL_DATABASE
    };
    local_db.join("diamond").join(file)
}

/// Taxa searched at `taxon`: its children minus the branch already searched,
/// or the taxon itself when it is a leaf. Empty when the only child was
/// the excluded branch.
pub fn build_scope(
    taxonomy: &TaxonomyIndex,
    taxon: TaxonId,
    excluded_branch: Option<TaxonId>,
) -> Vec<TaxonId> {
    let children = taxonomy.children(taxon);
    if children.is_empty() {
        return vec![taxon];
    }
    children
        .iter()
        .copied()
        .filter(|child| Some(*child) != excluded_branch)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayOutcome {
    /// The step taxon is excluded; the aligner was not called
    Excluded,
    Hits(Vec<HitRecord>),
}

pub struct AlignmentGateway<A: Aligner> {
    aligner: A,
    database: PathBuf,
    options: SearchOptions,
}

impl<A: Aligner> AlignmentGateway<A> {
    pub fn new(aligner: A, database: PathBuf, options: SearchOptions) -> Self {
        Self {
            aligner,
            database,
            options,
        }
    }

    pub fn aligner(&self) -> &A {
        &self.aligner
    }

    pub fn database(&self) -> &Path {
        &self.database
    }

    /// Search `scope` for the queries in `query_ids`, dropping subjects from excluded taxa
    pub fn search(
        &mut self,
        context: &AncestorContext,
        scope: &[TaxonId],
        query_fasta: &Path,
        query_ids: &BTreeSet<String>,
        exclusions: &HashSet<TaxonId>,
    ) -> BrownamingResult<GatewayOutcome> {
        if exclusions.contains(&context.taxon) {
            tracing::info!(
                "Step {}: {} ({}) is excluded, skipping search",
                context.step,
                context.name,
                context.taxon
            );
            return Ok(GatewayOutcome::Excluded);
        }

        let request = SearchRequest {
            query_fasta,
            query_ids,
            database: &self.database,
            taxon_list: scope,
            options: &self.options,
        };
        tracing::debug!(
            database = %self.database.display(),
            taxonlist = %request.taxon_list_arg(),
            "Submitting search"
        );

        let rows = self.aligner.search(&request)?;
        let total = rows.len();
        let hits: Vec<HitRecord> = rows
            .into_iter()
            .filter(|row| {
                row.subject_taxon
                    .map_or(true, |taxon| !exclusions.contains(&taxon))
            })
            .map(|row| HitRecord::from_row(row, context))
            .collect();

        if hits.len() < total {
            tracing::debug!(
                dropped = total - hits.len(),
                "Dropped hits from excluded taxa"
            );
        }
        Ok(GatewayOutcome::Hits(hits))
    }
}
