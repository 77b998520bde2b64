//! Runtime planning: per-step database sizes and predicted DIAMOND minutes.
//!
//! The plan is advisory. Size lookups that fail are logged and counted as zero,
//! so estimation never aborts a run.

use crate::orchestrator::next_taxon;
use brownaming_bio::TaxonomyIndex;
use brownaming_core::{BrownamingError, BrownamingResult, TaxonId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const TIME_MODEL_FILE: &str = "time_model.json";
pub const DBSIZE_TABLE: &str = "taxid2dbsize.json";
pub const UNIPROT_TAXONOMY_URL: &str = "https://rest.uniprot.org/taxonomy/search";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimePlan {
    pub total_minutes: f64,
    pub per_step_minutes: Vec<f64>,
    pub per_step_dbsize: Vec<u64>,
}

impl RuntimePlan {
    /// Estimate for a 1-based step, 0 beyond the planned walk
    pub fn minutes_for(&self, step: u32) -> f64 {
        step.checked_sub(1)
            .and_then(|i| self.per_step_minutes.get(i as usize))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn dbsize_for(&self, step: u32) -> u64 {
        step.checked_sub(1)
            .and_then(|i| self.per_step_dbsize.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    pub fn steps(&self) -> usize {
        self.per_step_minutes.len()
    }

    /// `hh:mm` rendering of the total
    pub fn total_hhmm(&self) -> String {
        let minutes = self.total_minutes.max(0.0) as u64;
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }
}

pub trait RuntimePredictor: Send + Sync {
    /// Predicted minutes for `queries` sequences against `dbsize` subjects
    fn predict_minutes(&self, queries: usize, dbsize: u64) -> f64;

    fn name(&self) -> &str;
}

/// Trained linear model: `intercept + query_coefficient * n + dbsize_coefficient * size`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTimeModel {
    pub intercept: f64,
    pub query_coefficient: f64,
    pub dbsize_coefficient: f64,
}

impl LinearTimeModel {
    pub fn load<P: AsRef<Path>>(path: P) -> BrownamingResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            BrownamingError::Serialization(format!("{}: {}", path.display(), e))
        })
    }
}

impl RuntimePredictor for LinearTimeModel {
    fn predict_minutes(&self, queries: usize, dbsize: u64) -> f64 {
        self.intercept
            + self.query_coefficient * queries as f64
            + self.dbsize_coefficient * dbsize as f64
    }

    fn name(&self) -> &str {
        "linear model"
    }
}

/// Fallback of roughly 0.1 s per query per 100k subjects
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPredictor;

impl RuntimePredictor for HeuristicPredictor {
    fn predict_minutes(&self, queries: usize, dbsize: u64) -> f64 {
        (queries as f64 * dbsize as f64 / 100_000.0) / 60.0
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// Cumulative protein counts under one taxon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbSizeCounts {
    pub swissprot: u64,
    pub total: u64,
}

impl DbSizeCounts {
    pub fn for_database(&self, swissprot_only: bool) -> u64 {
        if swissprot_only {
            self.swissprot
        } else {
            self.total
        }
    }
}

pub trait DbSizeSource: Send + Sync {
    fn counts(&self, taxon: TaxonId) -> BrownamingResult<DbSizeCounts>;

    fn name(&self) -> &str;
}

/// `taxonomy/taxid2dbsize.json`: `{"9606": {"swissprot": n, "total": n}, ...}`
#[derive(Debug, Clone, Default)]
pub struct LocalDbSizeTable {
    sizes: HashMap<TaxonId, DbSizeCounts>,
}

impl LocalDbSizeTable {
    pub fn load<P: AsRef<Path>>(path: P) -> BrownamingResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let raw: HashMap<String, DbSizeCounts> = serde_json::from_str(&contents)
            .map_err(|e| BrownamingError::Serialization(format!("{}: {}", path.display(), e)))?;

        let mut sizes = HashMap::with_capacity(raw.len());
        for (key, counts) in raw {
            let taxon = key.parse::<TaxonId>().map_err(|_| {
                BrownamingError::Serialization(format!(
                    "{}: non-numeric taxon key {:?}",
                    path.display(),
                    key
                ))
            })?;
            sizes.insert(taxon, counts);
        }
        Ok(Self { sizes })
    }

    pub fn from_counts(sizes: HashMap<TaxonId, DbSizeCounts>) -> Self {
        Self { sizes }
    }
}

impl DbSizeSource for LocalDbSizeTable {
    fn counts(&self, taxon: TaxonId) -> BrownamingResult<DbSizeCounts> {
        self.sizes
            .get(&taxon)
            .copied()
            .ok_or_else(|| BrownamingError::NotFound(format!("no database size for taxon {}", taxon)))
    }

    fn name(&self) -> &str {
        "local table"
    }
}

#[derive(Debug, Deserialize)]
struct TaxonomySearchResponse {
    #[serde(default)]
    results: Vec<TaxonomySearchResult>,
}

#[derive(Debug, Deserialize)]
struct TaxonomySearchResult {
    #[serde(default)]
    statistics: TaxonStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaxonStatistics {
    #[serde(default)]
    reviewed_protein_count: u64,
    #[serde(default)]
    unreviewed_protein_count: u64,
}

/// Counts from a UniProt taxonomy search response; no result means zero
pub fn parse_uniprot_statistics(body: &str) -> BrownamingResult<DbSizeCounts> {
    let response: TaxonomySearchResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .first()
        .map(|result| DbSizeCounts {
            swissprot: result.statistics.reviewed_protein_count,
            total: result.statistics.reviewed_protein_count
                + result.statistics.unreviewed_protein_count,
        })
        .unwrap_or_default())
}

/// Live counts from the UniProt REST taxonomy endpoint
pub struct UniProtStatistics {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl UniProtStatistics {
    pub fn new() -> BrownamingResult<Self> {
        Self::with_base_url(UNIPROT_TAXONOMY_URL)
    }

    pub fn with_base_url(base_url: &str) -> BrownamingResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("brownaming/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BrownamingError::Other(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn url_for(&self, taxon: TaxonId) -> String {
        format!(
            "{}?query=(tax_id:{})&format=json&fields=statistics",
            self.base_url, taxon
        )
    }
}

impl DbSizeSource for UniProtStatistics {
    fn counts(&self, taxon: TaxonId) -> BrownamingResult<DbSizeCounts> {
        let url = self.url_for(taxon);
        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| BrownamingError::Other(format!("UniProt request {}: {}", url, e)))?;
        parse_uniprot_statistics(&body)
    }

    fn name(&self) -> &str {
        "UniProt REST"
    }
}

pub struct RuntimeEstimator<'a> {
    taxonomy: &'a TaxonomyIndex,
    sizes: Box<dyn DbSizeSource + 'a>,
    predictor: Box<dyn RuntimePredictor + 'a>,
}

impl<'a> RuntimeEstimator<'a> {
    pub fn new(
        taxonomy: &'a TaxonomyIndex,
        sizes: Box<dyn DbSizeSource + 'a>,
        predictor: Box<dyn RuntimePredictor + 'a>,
    ) -> Self {
        Self {
            taxonomy,
            sizes,
            predictor,
        }
    }

    /// Pick the local size table when `<local_db>/taxonomy/taxid2dbsize.json` exists
    /// (UniProt otherwise) and the linear model when `model_path` holds one.
    pub fn from_local_db(
        taxonomy: &'a TaxonomyIndex,
        local_db: &Path,
        model_path: Option<&Path>,
    ) -> BrownamingResult<Self> {
        let table = local_db.join("taxonomy").join(DBSIZE_TABLE);
        let sizes: Box<dyn DbSizeSource> = if table.exists() {
            Box::new(LocalDbSizeTable::load(&table)?)
        } else {
            tracing::debug!("{} not found, database sizes come from UniProt", table.display());
            Box::new(UniProtStatistics::new()?)
        };

        let predictor: Box<dyn RuntimePredictor> = match model_path.filter(|p| p.exists()) {
            Some(path) => match LinearTimeModel::load(path) {
                Ok(model) => Box::new(model),
                Err(e) => {
                    tracing::warn!("Ignoring time model {}: {}", path.display(), e);
                    Box::new(HeuristicPredictor)
                }
            },
            None => Box::new(HeuristicPredictor),
        };

        Ok(Self::new(taxonomy, sizes, predictor))
    }

    /// Walk from `target` the same way the search does and predict each step
    pub fn estimate(
        &self,
        pending_count: usize,
        target: TaxonId,
        stop_taxon: Option<TaxonId>,
        swissprot_only: bool,
    ) -> RuntimePlan {
        let mut plan = RuntimePlan::default();
        let mut counted = 0u64;
        let mut current = Some(target);

        while let Some(taxon) = current {
            let cumulative = match self.sizes.counts(taxon) {
                Ok(counts) => counts.for_database(swissprot_only),
                Err(e) => {
                    tracing::warn!(
                        "Database size lookup for {} failed ({}), counting 0: {}",
                        taxon,
                        self.sizes.name(),
                        e
                    );
                    0
                }
            };
            if cumulative < counted {
                tracing::warn!(
                    "Cumulative database size of {} ({}) is below the {} sequences already counted",
                    taxon,
                    cumulative,
                    counted
                );
            }
            let incremental = cumulative.saturating_sub(counted);
            counted = counted.max(cumulative);

            let minutes = self
                .predictor
                .predict_minutes(pending_count, incremental)
                .max(0.0);
            plan.per_step_dbsize.push(incremental);
            plan.per_step_minutes.push(minutes);
            plan.total_minutes += minutes;

            current = next_taxon(self.taxonomy, taxon, stop_taxon);
        }

        tracing::debug!(
            steps = plan.steps(),
            predictor = self.predictor.name(),
            "Runtime plan ready"
        );
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brownaming_bio::taxonomy::TaxonomyTables;
    use brownaming_core::CELLULAR_ORGANISMS;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    /// 9606 -> 9605 -> 9604 -> 131567 -> 1
    fn chain() -> TaxonomyIndex {
        let mut tables = TaxonomyTables::default();
        for (taxon, parent) in [(9606, 9605), (9605, 9604), (9604, 131567), (131567, 1)] {
            tables.parent.insert(taxon, parent);
            tables.children.entry(parent).or_default().push(taxon);
        }
        TaxonomyIndex::from_tables(tables)
    }

    fn sizes(entries: &[(u32, u64, u64)]) -> Box<LocalDbSizeTable> {
        Box::new(LocalDbSizeTable::from_counts(
            entries
                .iter()
                .map(|&(t, swissprot, total)| (TaxonId(t), DbSizeCounts { swissprot, total }))
                .collect(),
        ))
    }

    #[test]
    fn test_incremental_sizes() {
        let taxonomy = chain();
        let estimator = RuntimeEstimator::new(
            &taxonomy,
            sizes(&[
                (9606, 20, 100),
                (9605, 25, 150),
                (9604, 40, 400),
                (131567, 500, 10_000),
            ]),
            Box::new(HeuristicPredictor),
        );

        let plan = estimator.estimate(10, TaxonId(9606), None, false);
        // Stops after cellular organisms
        assert_eq!(plan.per_step_dbsize, vec![100, 50, 250, 9_600]);

        let plan = estimator.estimate(10, TaxonId(9606), None, true);
        assert_eq!(plan.per_step_dbsize, vec![20, 5, 15, 460]);
    }

    #[test]
    fn test_stop_taxon_ends_walk() {
        let taxonomy = chain();
        let estimator = RuntimeEstimator::new(
            &taxonomy,
            sizes(&[(9606, 0, 100), (9605, 0, 150)]),
            Box::new(HeuristicPredictor),
        );
        let plan = estimator.estimate(10, TaxonId(9606), Some(TaxonId(9605)), false);
        assert_eq!(plan.steps(), 2);
        assert_eq!(plan.dbsize_for(2), 50);
        assert_eq!(plan.dbsize_for(3), 0);
    }

    #[test]
    fn test_missing_sizes_count_as_zero_and_shrinking_sizes_saturate() {
        let taxonomy = chain();
        let estimator = RuntimeEstimator::new(
            &taxonomy,
            // 9605 missing, 9604 smaller than what was already counted
            sizes(&[(9606, 0, 100), (9604, 0, 80), (CELLULAR_ORGANISMS.0, 0, 300)]),
            Box::new(HeuristicPredictor),
        );
        let plan = estimator.estimate(10, TaxonId(9606), None, false);
        assert_eq!(plan.per_step_dbsize, vec![100, 0, 0, 200]);
        assert!(plan.per_step_minutes.iter().all(|m| *m >= 0.0));
    }

    #[test]
    fn test_heuristic_and_linear_predictors() {
        assert_eq!(HeuristicPredictor.predict_minutes(600, 1_000_000), 100.0);

        let model = LinearTimeModel {
            intercept: 1.0,
            query_coefficient: 0.5,
            dbsize_coefficient: 0.001,
        };
        assert_eq!(model.predict_minutes(10, 1000), 7.0);

        // Negative predictions clamp to zero in the plan
        let negative = LinearTimeModel {
            intercept: -100.0,
            query_coefficient: 0.0,
            dbsize_coefficient: 0.0,
        };
        let taxonomy = chain();
        let estimator = RuntimeEstimator::new(&taxonomy, sizes(&[(9606, 0, 10)]), Box::new(negative));
        let plan = estimator.estimate(10, TaxonId(9606), Some(TaxonId(9606)), false);
        assert_eq!(plan.per_step_minutes, vec![0.0]);
        assert_eq!(plan.total_minutes, 0.0);
    }

    #[test]
    fn test_from_local_db_reads_table_and_model() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("taxonomy")).unwrap();
        fs::write(
            dir.path().join("taxonomy").join(DBSIZE_TABLE),
            r#"{"9606": {"swissprot": 1, "total": 60}}"#,
        )
        .unwrap();
        let model_path = dir.path().join(TIME_MODEL_FILE);
        fs::write(
            &model_path,
            r#"{"intercept": 2.0, "query_coefficient": 0.0, "dbsize_coefficient": 0.5}"#,
        )
        .unwrap();

        let taxonomy = chain();
        let estimator = RuntimeEstimator::from_local_db(&taxonomy, dir.path(), Some(model_path.as_path())).unwrap();
        let plan = estimator.estimate(3, TaxonId(9606), Some(TaxonId(9606)), false);
        assert_eq!(plan.per_step_dbsize, vec![60]);
        assert_eq!(plan.total_minutes, 32.0);
    }

    #[test]
    fn test_parse_uniprot_statistics() {
        let body = r#"{"results":[{"statistics":{"reviewedProteinCount":20435,"unreviewedProteinCount":184000,"proteomeCount":3}}]}"#;
        assert_eq!(
            parse_uniprot_statistics(body).unwrap(),
            DbSizeCounts {
                swissprot: 20435,
                total: 204435
            }
        );
        assert_eq!(
            parse_uniprot_statistics(r#"{"results":[]}"#).unwrap(),
            DbSizeCounts::default()
        );
        assert!(parse_uniprot_statistics("<html>").is_err());
    }

    #[test]
    fn test_plan_lookups() {
        let plan = RuntimePlan {
            total_minutes: 125.5,
            per_step_minutes: vec![5.5, 120.0],
            per_step_dbsize: vec![10, 20],
        };
        assert_eq!(plan.minutes_for(0), 0.0);
        assert_eq!(plan.minutes_for(2), 120.0);
        assert_eq!(plan.total_hhmm(), "02:05");
    }

    #[test]
    fn test_uniprot_url() {
        let source = UniProtStatistics::with_base_url("http://localhost:1/taxonomy/search").unwrap();
        assert_eq!(
            source.url_for(TaxonId(9606)),
            "http://localhost:1/taxonomy/search?query=(tax_id:9606)&format=json&fields=statistics"
        );
    }
}
