use crate::hit::{HitRecord, RankedHitSet};
use brownaming_core::config::ThresholdConfig;
use std::collections::BTreeMap;

/// Threshold filtering and top-3 ranking of one step's hits
#[derive(Debug, Clone)]
pub struct HitSelector {
    min_identity: f64,
    min_query_coverage: f64,
    min_subject_coverage: f64,
    min_bitscore: f64,
}

impl Default for HitSelector {
    fn default() -> Self {
        Self::new(&ThresholdConfig::default())
    }
}

impl HitSelector {
    pub fn new(thresholds: &ThresholdConfig) -> Self {
        Self {
            min_identity: thresholds.min_identity,
            min_query_coverage: thresholds.min_query_coverage,
            min_subject_coverage: thresholds.min_subject_coverage,
            min_bitscore: thresholds.min_bitscore,
        }
    }

    pub fn passes(&self, hit: &HitRecord) -> bool {
        if hit.query_length == 0 || hit.subject_length == 0 {
            return false;
        }
        hit.identity >= self.min_identity
            && hit.query_coverage() >= self.min_query_coverage
            && hit.subject_coverage() >= self.min_subject_coverage
            && hit.bitscore >= self.min_bitscore
    }

    /// Rank the qualifying hits of a single step per query. Each hit is keyed by
    /// the step recorded in its ancestor context; earlier steps are not merged in.
    pub fn select<I>(&self, hits: I) -> BTreeMap<String, RankedHitSet>
    where
        I: IntoIterator<Item = HitRecord>,
    {
        let mut best: BTreeMap<String, RankedHitSet> = BTreeMap::new();
        let mut rejected = 0usize;

        for hit in hits {
            if !self.passes(&hit) {
                rejected += 1;
                continue;
            }
            best.entry(hit.query_id.clone()).or_default().offer(hit);
        }

        tracing::debug!(
            queries = best.len(),
            rejected,
            "Selected best hits"
        );
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::tests::hit;
    use crate::hit::MAX_RANKED_HITS;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_bitscore_minimum() {
        let selector = HitSelector::default();
        let selected = selector.select(vec![
            hit("q1", "low", 1, 49.9, 90.0),
            hit("q1", "ok", 1, 50.0, 90.0),
            hit("q2", "low", 1, 10.0, 90.0),
        ]);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected["q1"].len(), 1);
        assert_eq!(selected["q1"].hits()[0].subject_id, "ok");
    }

    #[test]
    fn test_zero_lengths_are_discarded() {
        let selector = HitSelector::default();
        let mut no_query = hit("q1", "a", 1, 100.0, 90.0);
        no_query.query_length = 0;
        let mut no_subject = hit("q1", "b", 1, 100.0, 90.0);
        no_subject.subject_length = 0;

        assert!(selector.select(vec![no_query, no_subject]).is_empty());
    }

    #[test]
    fn test_identity_and_coverage_minimums() {
        let selector = HitSelector::new(&ThresholdConfig {
            min_identity: 30.0,
            min_query_coverage: 0.5,
            min_subject_coverage: 0.7,
            min_bitscore: 0.0,
        });

        let low_identity = hit("q", "a", 1, 100.0, 29.0);
        let mut short_query = hit("q", "b", 1, 100.0, 90.0);
        short_query.alignment_length = 40;
        let mut short_subject = hit("q", "c", 1, 100.0, 90.0);
        short_subject.subject_length = 200;
        let good = hit("q", "d", 1, 100.0, 90.0);

        let selected = selector.select(vec![low_identity, short_query, short_subject, good]);
        let ids: Vec<&str> = selected["q"].iter().map(|h| h.subject_id.as_str()).collect();
        assert_eq!(ids, vec!["d"]);
    }

    #[test]
    fn test_top_three_per_query() {
        let selector = HitSelector::default();
        let hits = vec![
            hit("q1", "s100", 1, 100.0, 50.0),
            hit("q1", "s300", 1, 300.0, 50.0),
            hit("q1", "s200a", 1, 200.0, 40.0),
            hit("q1", "s200b", 1, 200.0, 60.0),
            hit("q1", "s150", 1, 150.0, 50.0),
            hit("q2", "s80", 1, 80.0, 50.0),
        ];

        let selected = selector.select(hits);
        let q1: Vec<&str> = selected["q1"].iter().map(|h| h.subject_id.as_str()).collect();
        assert_eq!(q1, vec!["s300", "s200b", "s200a"]);
        assert_eq!(selected["q2"].len(), 1);
    }

    fn arb_hit() -> impl Strategy<Value = HitRecord> {
        (0usize..4, 0u32..200, 1u32..200, 1u32..200, 0.0f64..500.0, 0.0f64..100.0).prop_map(
            |(q, alen, qlen, slen, bits, pid)| {
                let mut h = hit(&format!("q{}", q), "s", 1, bits, pid);
                h.alignment_length = alen;
                h.query_length = qlen;
                h.subject_length = slen;
                h
            },
        )
    }

    proptest! {
        #[test]
        fn prop_at_most_three_sorted(hits in proptest::collection::vec(arb_hit(), 0..60)) {
            let selected = HitSelector::default().select(hits);
            for set in selected.values() {
                prop_assert!(set.len() <= MAX_RANKED_HITS);
                prop_assert!(!set.is_empty());
                let keys: Vec<_> = set.iter().map(HitRecord::priority_key).collect();
                prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
            }
        }

        #[test]
        fn prop_query_coverage_minimum_is_enforced(
            hits in proptest::collection::vec(arb_hit(), 0..60),
            min_qcov in 0.0f64..2.0,
        ) {
            let selector = HitSelector::new(&ThresholdConfig {
                min_query_coverage: min_qcov,
                ..ThresholdConfig::default()
            });
            for set in selector.select(hits).values() {
                prop_assert!(set.iter().all(|h| h.query_coverage() >= min_qcov));
            }
        }
    }
}
