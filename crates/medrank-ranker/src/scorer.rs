//! Composite score computation.
//!
//! S(school) = Σ over eligible attributes of normed[attr] × weight[attr] / 100
//!
//! No clamping or rounding: the sum is carried at full precision into the ranker.

use std::collections::BTreeMap;

use tracing::debug;

use crate::attributes::Attribute;
use crate::dataset::Dataset;
use crate::normalise::{compute_stats, normalise_dataset};
use crate::weights::WeightVector;

/// Weighted sum of one school's normalised components.
///
/// Display-only attributes and zero weights contribute nothing.
pub fn compute_composite_score(normed: &BTreeMap<Attribute, f64>, weights: &WeightVector) -> f64 {
    normed
        .iter()
        .filter(|(attr, _)| attr.is_eligible())
        .map(|(&attr, n)| n * (weights.get(attr) / 100.0))
        .sum()
}

/// Composite score for every school, aligned with the dataset order.
///
/// Only attributes with a positive weight are normalised; the others would
/// contribute exactly 0 anyway.
pub fn score_dataset(dataset: &Dataset, weights: &WeightVector) -> Vec<f64> {
    let active = weights.active_attributes();
    debug!(
        schools = dataset.len(),
        active_attributes = active.len(),
        total_weight = weights.total(),
        "Scoring dataset"
    );

    let stats = compute_stats(dataset, active);
    normalise_dataset(dataset, &stats)
        .iter()
        .map(|normed| compute_composite_score(normed, weights))
        .collect()
}
