//! Scripted aligner standing in for DIAMOND in tests

use crate::traits::{Aligner, AlignmentRow, SearchRequest};
use brownaming_core::{BrownamingError, BrownamingResult, TaxonId};
use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;

/// What one search call observed
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub query_fasta: PathBuf,
    pub query_ids: BTreeSet<String>,
    pub database: PathBuf,
    pub taxon_list: Vec<TaxonId>,
}

#[derive(Debug, Clone)]
enum Response {
    Rows(Vec<AlignmentRow>),
    Fail(String),
}

/// Replays queued responses, one per search call. Rows for queries that were
/// not submitted are dropped; an exhausted queue answers with no rows.
#[derive(Debug, Default)]
pub struct ScriptedAligner {
    responses: VecDeque<Response>,
    calls: Vec<RecordedCall>,
}

impl ScriptedAligner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the rows returned by the next unanswered call
    pub fn respond(mut self, rows: Vec<AlignmentRow>) -> Self {
        self.responses.push_back(Response::Rows(rows));
        self
    }

    /// Queue a tool failure
    pub fn fail(mut self, message: &str) -> Self {
        self.responses.push_back(Response::Fail(message.to_string()));
        self
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Convenience constructor for a row
    pub fn row(
        query_id: &str,
        subject_id: &str,
        subject_taxon: u32,
        identity: f64,
        bitscore: f64,
    ) -> AlignmentRow {
        AlignmentRow {
            query_id: query_id.to_string(),
            subject_id: subject_id.to_string(),
            identity,
            positives: identity,
            alignment_length: 100,
            evalue: 1e-20,
            bitscore,
            query_length: 100,
            subject_length: 100,
            subject_taxon: Some(TaxonId(subject_taxon)),
            subject_title: format!("{} Scripted protein OS=Taxon {} OX={}", subject_id, subject_taxon, subject_taxon),
        }
    }
}

impl Aligner for ScriptedAligner {
    fn search(&mut self, request: &SearchRequest<'_>) -> BrownamingResult<Vec<AlignmentRow>> {
        self.calls.push(RecordedCall {
            query_fasta: request.query_fasta.to_path_buf(),
            query_ids: request.query_ids.clone(),
            database: request.database.to_path_buf(),
            taxon_list: request.taxon_list.to_vec(),
        });

        match self.responses.pop_front() {
            Some(Response::Rows(rows)) => Ok(rows
                .into_iter()
                .filter(|row| request.query_ids.contains(&row.query_id))
                .collect()),
            Some(Response::Fail(message)) => Err(BrownamingError::Alignment(message)),
            None => Ok(Vec::new()),
        }
    }

    fn version(&self) -> BrownamingResult<String> {
        Ok("ScriptedAligner 1.0.0".to_string())
    }

    fn is_available(&self) -> bool {
        true
    }
}
