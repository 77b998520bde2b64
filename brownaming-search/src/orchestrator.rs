//! The ancestor walk
//!
//! Starting at the target species, every step searches one taxonomic level for
//! the queries that still lack three hits, then climbs to the parent. The walk
//! stops when nothing is pending, at the configured last taxon, at
//! "cellular organisms" or at the root.

use crate::checkpoint::CheckpointManager;
use crate::gateway::{build_scope, diamond_database, AlignmentGateway, GatewayOutcome};
use crate::hit::AncestorContext;
use crate::selector::HitSelector;
use crate::state::{RunParameters, RunState, StepStatistics};
use brownaming_bio::{parse_fasta, write_pending_fasta, Sequence, TaxonomyIndex};
use brownaming_core::{BrownamingResult, TaxonId, CELLULAR_ORGANISMS};
use brownaming_tools::{Aligner, SearchOptions};
use chrono::Utc;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Taxon searched after `current`, `None` when the walk ends there
pub fn next_taxon(
    taxonomy: &TaxonomyIndex,
    current: TaxonId,
    last_tax: Option<TaxonId>,
) -> Option<TaxonId> {
    if Some(current) == last_tax || current == CELLULAR_ORGANISMS {
        None
    } else {
        taxonomy.ancestor(current)
    }
}

pub struct SearchOrchestrator<'a, A: Aligner> {
    taxonomy: &'a TaxonomyIndex,
    gateway: AlignmentGateway<A>,
    selector: HitSelector,
    checkpoint: CheckpointManager,
    exclusions: HashSet<TaxonId>,
    queries: Vec<Sequence>,
    proteins: PathBuf,
    last_tax: Option<TaxonId>,
}

impl<'a, A: Aligner> SearchOrchestrator<'a, A> {
    /// Reads the query FASTA and expands the excluded taxa to their descendants
    pub fn new(
        taxonomy: &'a TaxonomyIndex,
        aligner: A,
        checkpoint: CheckpointManager,
        parameters: &RunParameters,
    ) -> BrownamingResult<Self> {
        let queries = parse_fasta(&parameters.proteins)?;
        let exclusions = taxonomy.descendants_of_all(&parameters.ex_tax);
        if !exclusions.is_empty() {
            tracing::info!(
                "Excluding {} taxa below {:?}",
                exclusions.len(),
                parameters.ex_tax.iter().map(|t| t.value()).collect::<Vec<_>>()
            );
        }

        let gateway = AlignmentGateway::new(
            aligner,
            diamond_database(&parameters.local_db, parameters.swissprot_only),
            SearchOptions::from(&parameters.search),
        );
        tracing::info!(
            "Searching {} with {} threads",
            gateway.database().display(),
            parameters.search.effective_threads()
        );

        Ok(Self {
            taxonomy,
            gateway,
            selector: HitSelector::new(&parameters.thresholds),
            checkpoint,
            exclusions,
            queries,
            proteins: parameters.proteins.clone(),
            last_tax: parameters.last_tax,
        })
    }

    /// Query ids in input order
    pub fn query_ids(&self) -> Vec<String> {
        self.queries.iter().map(|s| s.id.clone()).collect()
    }

    pub fn queries(&self) -> &[Sequence] {
        &self.queries
    }

    pub fn aligner(&self) -> &A {
        self.gateway.aligner()
    }

    pub fn checkpoint(&self) -> &CheckpointManager {
        &self.checkpoint
    }

    /// Walk until done, then remove the checkpoint files
    pub fn run(&mut self, mut state: RunState) -> BrownamingResult<RunState> {
        while !state.is_done() {
            self.step(&mut state)?;
        }

        tracing::info!(
            "Search finished after {} steps: {} of {} proteins have a hit, {} still pending",
            state.step,
            state.assigned.len(),
            state.query_ids.len(),
            state.pending.len()
        );
        self.checkpoint.finish()?;
        Ok(state)
    }

    /// Search the current taxon and climb one level
    pub fn step(&mut self, state: &mut RunState) -> BrownamingResult<()> {
        let taxon = match state.current_taxon {
            Some(taxon) => taxon,
            None => return Ok(()),
        };
        let started = Instant::now();

        state.step += 1;
        let step = state.step;
        let context = AncestorContext {
            taxon,
            name: self.taxonomy.name(taxon).to_string(),
            rank: self.taxonomy.rank(taxon).to_string(),
            step,
        };
        let submitted = state.pending.len();
        let dbsize = state.plan.dbsize_for(step);
        let estimated_minutes = state.plan.minutes_for(step);

        tracing::info!(
            "Step {}: Searching among {} sequences of {} ({} ; {}) with {} pending sequences (estimated runtime={:.2} minutes)...",
            step,
            dbsize,
            context.name,
            taxon,
            context.rank,
            submitted,
            estimated_minutes
        );

        let scope = build_scope(self.taxonomy, taxon, state.previous_taxon);
        let mut aligner_ran = false;
        let mut newly_resolved = 0;
        let queries_with_hit = if scope.is_empty() {
            tracing::info!(
                "Step {}: Subject database empty, continue to upper taxon",
                step
            );
            state.statistics.last().map_or(0, |s| s.queries_with_hit)
        } else {
            let (query_fasta, is_temporary) = self.pending_fasta(state)?;
            let outcome = self.gateway.search(
                &context,
                &scope,
                &query_fasta,
                &state.pending,
                &self.exclusions,
            );
            if is_temporary {
                if let Err(e) = fs::remove_file(&query_fasta) {
                    tracing::warn!("Could not remove {}: {}", query_fasta.display(), e);
                }
            }

            if let GatewayOutcome::Hits(hits) = outcome? {
                aligner_ran = true;
                for (query, set) in self.selector.select(hits) {
                    if set.is_full() && state.pending.remove(&query) {
                        newly_resolved += 1;
                    }
                    state.assigned.insert(query, set);
                }
            }

            tracing::info!(
                "Step {}: Found a satisfying hit for {} proteins",
                step,
                state.assigned.len()
            );
            state.assigned.len()
        };

        state.previous_taxon = Some(taxon);
        state.current_taxon = next_taxon(self.taxonomy, taxon, self.last_tax);

        state.elapsed_secs += started.elapsed().as_secs_f64();
        state.last_updated = Utc::now();
        let elapsed_minutes = state.elapsed_minutes();
        tracing::info!("Elapsed time: {:.2} minutes", elapsed_minutes);

        state.statistics.push(StepStatistics {
            step,
            dbsize,
            estimated_minutes,
            taxon,
            taxon_name: context.name,
            rank: context.rank,
            queries_submitted: submitted,
            queries_with_hit,
            newly_resolved,
            aligner_ran,
            elapsed_minutes,
        });

        self.checkpoint
            .maybe_checkpoint(state, Duration::from_secs_f64(state.elapsed_secs.max(0.0)))?;
        Ok(())
    }

    /// The input file while nothing is resolved, otherwise a temporary FASTA of the pending queries
    fn pending_fasta(&self, state: &RunState) -> BrownamingResult<(PathBuf, bool)> {
        if state.all_pending() {
            return Ok((self.proteins.clone(), false));
        }

        let path = self.checkpoint.run_dir().join(format!(
            ".pending_{}_{}.fasta",
            std::process::id(),
            state.step
        ));
        let pending: HashSet<&str> = state.pending.iter().map(String::as_str).collect();
        let written = write_pending_fasta(&path, &self.queries, &pending)?;
        tracing::debug!(written, path = %path.display(), "Wrote pending queries");
        Ok((path, true))
    }
}
