//! The ranking pipeline: normalise -> score -> rank.
//!
//! A pure function of (dataset snapshot, weights). Nothing is cached
//! between runs; changing the weights or the cost view means calling it
//! again on the new inputs.

use std::collections::BTreeMap;

use medrank_common::CostView;
use serde::Serialize;
use tracing::info;

use crate::attributes::{eligible_attributes, Attribute};
use crate::dataset::Dataset;
use crate::normalise::{compute_stats, NormalizationStats};
use crate::ranker::{rank_scored, ScoredRecord};
use crate::scorer::score_dataset;
use crate::weights::WeightVector;

/// Output of one ranking run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRun {
    pub cost_view: CostView,
    /// Stats of every eligible attribute over the effective dataset.
    pub stats: BTreeMap<Attribute, NormalizationStats>,
    pub ranked: Vec<ScoredRecord>,
}

/// Rank an effective dataset with the given weights.
pub fn rank(dataset: &Dataset, weights: &WeightVector) -> Vec<ScoredRecord> {
    let scores = score_dataset(dataset, weights);
    let scored = dataset.records().iter().cloned().zip(scores).collect();
    rank_scored(scored)
}

/// Select the cost view, then rank.
pub fn run(dataset: &Dataset, cost_view: CostView, weights: &WeightVector) -> RankingRun {
    let effective = dataset.effective(cost_view);
    let stats = compute_stats(&effective, eligible_attributes());
    let ranked = rank(&effective, weights);

    info!(
        schools = ranked.len(),
        cost_view = ?cost_view,
        top = ranked.first().map(|r| r.school.name.as_str()).unwrap_or("-"),
        "Ranking complete"
    );

    RankingRun { cost_view, stats, ranked }
}

/// Case-insensitive name filter. Ranks are those of the full list.
///
/// Only the display name is matched; records carry no alternate names.
pub fn search<'a>(ranked: &'a [ScoredRecord], term: &str) -> Vec<&'a ScoredRecord> {
    let needle = term.to_lowercase();
    ranked
        .iter()
        .filter(|r| needle.is_empty() || r.school.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SchoolRecord;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            SchoolRecord::new("State University")
                .with(Attribute::TuitionAndFees, 30_000.0)
                .with_out_of_state(Attribute::TuitionAndFees, 70_000.0),
            SchoolRecord::new("Private Institute").with(Attribute::TuitionAndFees, 50_000.0),
        ])
    }

    #[test]
    fn test_cost_view_changes_order() {
        let w = WeightVector::from_percentages([(Attribute::TuitionAndFees, 100)]).unwrap();

        let in_state = run(&dataset(), CostView::InState, &w);
        assert_eq!(in_state.ranked[0].school.name, "State University");
        assert_eq!(in_state.stats[&Attribute::TuitionAndFees].max, 50_000.0);

        let out = run(&dataset(), CostView::OutOfState, &w);
        assert_eq!(out.ranked[0].school.name, "Private Institute");
        assert_eq!(out.stats[&Attribute::TuitionAndFees].max, 70_000.0);
    }

    #[test]
    fn test_search_keeps_ranks() {
        let w = WeightVector::from_percentages([(Attribute::TuitionAndFees, 100)]).unwrap();
        let ranked = rank(&dataset(), &w);
        let hits = search(&ranked, "PRIVATE");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rank, 2);
        assert_eq!(search(&ranked, "").len(), 2);
    }

    #[test]
    fn test_empty_dataset() {
        let result = run(&Dataset::default(), CostView::InState, &WeightVector::product_default());
        assert!(result.ranked.is_empty());
        assert!(result.stats.values().all(|s| *s == NormalizationStats::SYNTHETIC));
    }
}
