//! Hit records and the per-query top-3 buffer

use brownaming_core::TaxonId;
use brownaming_tools::AlignmentRow;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Hits kept per query; a query with this many hits is resolved
pub const MAX_RANKED_HITS: usize = 3;

/// The taxonomic level whose search produced a hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncestorContext {
    pub taxon: TaxonId,
    pub name: String,
    pub rank: String,
    pub step: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    pub query_id: String,
    pub subject_id: String,
    pub subject_title: String,
    pub subject_taxon: Option<TaxonId>,
    pub identity: f64,
    pub positives: f64,
    pub alignment_length: u32,
    pub evalue: f64,
    pub bitscore: f64,
    pub query_length: u32,
    pub subject_length: u32,
    pub ancestor: AncestorContext,
}

impl HitRecord {
    pub fn from_row(row: AlignmentRow, ancestor: &AncestorContext) -> Self {
        Self {
            query_id: row.query_id,
            subject_id: row.subject_id,
            subject_title: row.subject_title,
            subject_taxon: row.subject_taxon,
            identity: row.identity,
            positives: row.positives,
            alignment_length: row.alignment_length,
            evalue: row.evalue,
            bitscore: row.bitscore,
            query_length: row.query_length,
            subject_length: row.subject_length,
            ancestor: ancestor.clone(),
        }
    }

    /// Aligned fraction of the query, 0 for an empty query
    pub fn query_coverage(&self) -> f64 {
        if self.query_length == 0 {
            return 0.0;
        }
        self.alignment_length as f64 / self.query_length as f64
    }

    pub fn subject_coverage(&self) -> f64 {
        if self.subject_length == 0 {
            return 0.0;
        }
        self.alignment_length as f64 / self.subject_length as f64
    }

    pub fn priority_key(&self) -> PriorityKey {
        PriorityKey {
            step: self.ancestor.step,
            bitscore: self.bitscore,
            identity: self.identity,
        }
    }
}

/// Ordering of hits: earlier step first, then higher bitscore, then higher identity.
/// Lower keys are better.
#[derive(Debug, Clone, Copy)]
pub struct PriorityKey {
    pub step: u32,
    pub bitscore: f64,
    pub identity: f64,
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.step
            .cmp(&other.step)
            .then_with(|| other.bitscore.total_cmp(&self.bitscore))
            .then_with(|| other.identity.total_cmp(&self.identity))
    }
}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PriorityKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriorityKey {}

/// At most [`MAX_RANKED_HITS`] hits for one query, best first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedHitSet {
    hits: Vec<HitRecord>,
}

impl RankedHitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate. Under capacity it is inserted; at capacity it replaces
    /// the worst hit only when its key is strictly lower. Returns whether it was kept.
    pub fn offer(&mut self, hit: HitRecord) -> bool {
        if self.hits.len() < MAX_RANKED_HITS {
            self.hits.push(hit);
        } else {
            let worst = match self.hits.last() {
                Some(worst) => worst.priority_key(),
                None => return false,
            };
            if hit.priority_key() >= worst {
                return false;
            }
            let last = self.hits.len() - 1;
            self.hits[last] = hit;
        }
        // Stable: equal keys keep arrival order
        self.hits.sort_by_key(HitRecord::priority_key);
        true
    }

    pub fn best(&self) -> Option<&HitRecord> {
        self.hits.first()
    }

    pub fn hits(&self) -> &[HitRecord] {
        &self.hits
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HitRecord> {
        self.hits.iter()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.hits.len() >= MAX_RANKED_HITS
    }
}

impl<'a> IntoIterator for &'a RankedHitSet {
    type Item = &'a HitRecord;
    type IntoIter = std::slice::Iter<'a, HitRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

/// Final result for one query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Hit(RankedHitSet),
    NoHit,
}

impl QueryOutcome {
    pub fn best(&self) -> Option<&HitRecord> {
        match self {
            QueryOutcome::Hit(set) => set.best(),
            QueryOutcome::NoHit => None,
        }
    }
}
