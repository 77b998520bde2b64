//! Durable run state

use crate::estimator::RuntimePlan;
use crate::hit::{QueryOutcome, RankedHitSet};
use brownaming_core::config::{SearchConfig, ThresholdConfig};
use brownaming_core::TaxonId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Everything needed to restart a run from scratch, saved as `state_args.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    pub proteins: PathBuf,
    pub species: TaxonId,
    pub last_tax: Option<TaxonId>,
    #[serde(default)]
    pub ex_tax: Vec<TaxonId>,
    #[serde(default)]
    pub swissprot_only: bool,
    pub local_db: PathBuf,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
}

impl RunParameters {
    pub fn new(proteins: PathBuf, species: TaxonId, local_db: PathBuf) -> Self {
        Self {
            proteins,
            species,
            last_tax: None,
            ex_tax: Vec::new(),
            swissprot_only: false,
            local_db,
            search: SearchConfig::default(),
            thresholds: ThresholdConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepStatistics {
    pub step: u32,
    /// Incremental database size searched at this level
    pub dbsize: u64,
    pub estimated_minutes: f64,
    pub taxon: TaxonId,
    pub taxon_name: String,
    pub rank: String,
    pub queries_submitted: usize,
    /// Queries holding at least one hit after this step
    pub queries_with_hit: usize,
    /// Queries that left the pending set during this step
    pub newly_resolved: usize,
    pub aligner_ran: bool,
    /// Cumulative run time when the step finished
    pub elapsed_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: String,
    pub parameters: RunParameters,
    /// Query ids in input order
    pub query_ids: Vec<String>,
    pub pending: BTreeSet<String>,
    pub assigned: BTreeMap<String, RankedHitSet>,
    pub current_taxon: Option<TaxonId>,
    /// Branch searched by the previous step, excluded from the next scope
    pub previous_taxon: Option<TaxonId>,
    pub step: u32,
    pub statistics: Vec<StepStatistics>,
    pub elapsed_secs: f64,
    pub plan: RuntimePlan,
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl RunState {
    pub fn new(
        run_id: String,
        parameters: RunParameters,
        query_ids: Vec<String>,
        plan: RuntimePlan,
    ) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            pending: query_ids.iter().cloned().collect(),
            current_taxon: Some(parameters.species),
            parameters,
            query_ids,
            assigned: BTreeMap::new(),
            previous_taxon: None,
            step: 0,
            statistics: Vec::new(),
            elapsed_secs: 0.0,
            plan,
            started_at: now,
            last_updated: now,
        }
    }

    /// No pending query left or no taxon left to search
    pub fn is_done(&self) -> bool {
        self.pending.is_empty() || self.current_taxon.is_none()
    }

    /// Nothing resolved yet: the input file can be searched as-is
    pub fn all_pending(&self) -> bool {
        self.pending.len() == self.query_ids.len()
    }

    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed_secs / 60.0
    }

    pub fn outcome(&self, query_id: &str) -> QueryOutcome {
        match self.assigned.get(query_id) {
            Some(set) if !set.is_empty() => QueryOutcome::Hit(set.clone()),
            _ => QueryOutcome::NoHit,
        }
    }

    /// Outcomes in input order
    pub fn outcomes(&self) -> Vec<(&str, QueryOutcome)> {
        self.query_ids
            .iter()
            .map(|id| (id.as_str(), self.outcome(id)))
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "run {}: step {}, {}/{} queries with a hit, {} pending, {:.2} minutes elapsed",
            self.run_id,
            self.step,
            self.assigned.len(),
            self.query_ids.len(),
            self.pending.len(),
            self.elapsed_minutes()
        )
    }
}
