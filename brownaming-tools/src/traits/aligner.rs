/// Traits for homology-search tools
use brownaming_core::config::SearchConfig;
use brownaming_core::{BrownamingResult, TaxonId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// One tabular output row of a protein search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRow {
    pub query_id: String,
    pub subject_id: String,
    pub identity: f64,
    pub positives: f64,
    pub alignment_length: u32,
    pub evalue: f64,
    pub bitscore: f64,
    pub query_length: u32,
    pub subject_length: u32,
    /// First taxon of the subject's taxon list
    pub subject_taxon: Option<TaxonId>,
    pub subject_title: String,
}

/// Search parameters forwarded to the tool
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub max_target_seqs: usize,
    pub evalue: f64,
    pub sensitivity: String,
    pub threads: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_target_seqs: config.max_target_seqs,
            evalue: config.evalue,
            sensitivity: config.sensitivity.clone(),
            threads: config.effective_threads(),
        }
    }
}

impl SearchOptions {
    /// `--more-sensitive` style flag, `None` for the tool's default mode
    pub fn sensitivity_flag(&self) -> Option<String> {
        let mode = self.sensitivity.trim().trim_start_matches("--");
        match mode {
            "" | "default" => None,
            mode => Some(format!("--{}", mode)),
        }
    }
}

/// One invocation of the search tool
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    /// FASTA holding at least the queries in `query_ids`
    pub query_fasta: &'a Path,
    pub query_ids: &'a BTreeSet<String>,
    pub database: &'a Path,
    /// Subjects are restricted to these taxa and their descendants
    pub taxon_list: &'a [TaxonId],
    pub options: &'a SearchOptions,
}

impl SearchRequest<'_> {
    pub fn taxon_list_arg(&self) -> String {
        self.taxon_list
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Trait for homology-search tools
pub trait Aligner: Send {
    /// Run one search and return every output row
    fn search(&mut self, request: &SearchRequest<'_>) -> BrownamingResult<Vec<AlignmentRow>>;

    /// Get tool version
    fn version(&self) -> BrownamingResult<String>;

    /// Check if tool is available
    fn is_available(&self) -> bool;
}
