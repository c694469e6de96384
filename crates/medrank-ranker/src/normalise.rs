//! Score normalisation.
//!
//! Per attribute, min/max are taken over the present values of the
//! effective dataset and each school's raw value is mapped into [0, 1].
//! Missing values are replaced by the worst-case extreme for the
//! attribute's direction, so a gap can never outscore real data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attributes::{Attribute, Direction};
use crate::dataset::Dataset;

/// Min/max of an attribute over one effective dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    pub min: f64,
    pub max: f64,
}

impl NormalizationStats {
    /// Stand-in used when no school has a value for the attribute.
    pub const SYNTHETIC: NormalizationStats = NormalizationStats { min: 0.0, max: 1.0 };

    /// Exact min/max of the finite values, or [`Self::SYNTHETIC`] if there are none.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<NormalizationStats>, v| {
                Some(match acc {
                    None => NormalizationStats { min: v, max: v },
                    Some(s) => NormalizationStats { min: s.min.min(v), max: s.max.max(v) },
                })
            })
            .unwrap_or(Self::SYNTHETIC)
    }

    /// Map a raw value (or a gap) into [0, 1] for the given direction.
    ///
    /// A degenerate range yields 0 in both directions.
    pub fn normalise(&self, raw: Option<f64>, direction: Direction) -> f64 {
        if self.max <= self.min {
            return 0.0;
        }
        let value = match raw.filter(|v| v.is_finite()) {
            Some(v) => v,
            None => match direction {
                Direction::Inverse => self.max,
                Direction::Direct => self.min,
            },
        };
        let normed = minmax_normalise(value, self.min, self.max);
        match direction {
            Direction::Direct => normed,
            Direction::Inverse => 1.0 - normed,
        }
    }
}

/// Min-max normalisation within `[min_val, max_val]`.
///
/// A degenerate range (`max_val <= min_val`) maps everything to 0.
pub fn minmax_normalise(value: f64, min_val: f64, max_val: f64) -> f64 {
    if max_val > min_val {
        (value - min_val) / (max_val - min_val)
    } else {
        0.0
    }
}

/// Compute stats for each requested attribute over the dataset.
pub fn compute_stats(
    dataset: &Dataset,
    attributes: impl IntoIterator<Item = Attribute>,
) -> BTreeMap<Attribute, NormalizationStats> {
    attributes
        .into_iter()
        .map(|attr| {
            let present: Vec<f64> = dataset.iter().filter_map(|r| r.value(attr)).collect();
            if present.is_empty() {
                debug!(attribute = %attr, "No present values; using synthetic stats");
            }
            (attr, NormalizationStats::from_values(present))
        })
        .collect()
}

/// Normalised values for every school, aligned with the dataset order.
///
/// Only attributes present in `stats` are normalised.
pub fn normalise_dataset(
    dataset: &Dataset,
    stats: &BTreeMap<Attribute, NormalizationStats>,
) -> Vec<BTreeMap<Attribute, f64>> {
    dataset
        .iter()
        .map(|record| {
            stats
                .iter()
                .map(|(&attr, s)| (attr, s.normalise(record.value(attr), attr.direction())))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SchoolRecord;

    fn gpa_dataset(values: &[Option<f64>]) -> Dataset {
        Dataset::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let mut r = SchoolRecord::new(format!("School {i}"));
                    r.set(Attribute::AverageGpa, *v);
                    r
                })
                .collect(),
        )
    }

    #[test]
    fn test_minmax_basic() {
        assert!((minmax_normalise(5.0, 0.0, 10.0) - 0.5).abs() < 1e-9);
        assert_eq!(minmax_normalise(3.0, 3.0, 3.0), 0.0);
    }

    #[test]
    fn test_stats_ignore_missing() {
        let ds = gpa_dataset(&[Some(3.5), Some(3.8), None]);
        let stats = compute_stats(&ds, [Attribute::AverageGpa]);
        assert_eq!(stats[&Attribute::AverageGpa], NormalizationStats { min: 3.5, max: 3.8 });
    }

    #[test]
    fn test_synthetic_stats_when_all_missing() {
        let ds = gpa_dataset(&[None, None]);
        let stats = compute_stats(&ds, [Attribute::AverageGpa]);
        assert_eq!(stats[&Attribute::AverageGpa], NormalizationStats::SYNTHETIC);
        let normed = normalise_dataset(&ds, &stats);
        assert!(normed.iter().all(|row| row[&Attribute::AverageGpa] == 0.0));
    }

    #[test]
    fn test_synthetic_fallback_is_zero_for_inverse() {
        let s = NormalizationStats::SYNTHETIC;
        assert_eq!(s.normalise(None, Direction::Inverse), 0.0);
        assert_eq!(s.normalise(None, Direction::Direct), 0.0);
    }

    #[test]
    fn test_uniform_attribute_is_zero_both_directions() {
        let s = NormalizationStats::from_values([120.0, 120.0, 120.0]);
        assert_eq!(s.normalise(Some(120.0), Direction::Direct), 0.0);
        assert_eq!(s.normalise(Some(120.0), Direction::Inverse), 0.0);
        assert_eq!(s.normalise(None, Direction::Inverse), 0.0);
    }

    #[test]
    fn test_missing_direct_matches_minimum() {
        let s = NormalizationStats { min: 3.5, max: 3.8 };
        assert_eq!(s.normalise(None, Direction::Direct), s.normalise(Some(3.5), Direction::Direct));
        assert_eq!(s.normalise(None, Direction::Direct), 0.0);
    }

    #[test]
    fn test_missing_inverse_matches_maximum() {
        let s = NormalizationStats { min: 100_000.0, max: 200_000.0 };
        assert_eq!(
            s.normalise(None, Direction::Inverse),
            s.normalise(Some(200_000.0), Direction::Inverse)
        );
        assert_eq!(s.normalise(Some(100_000.0), Direction::Inverse), 1.0);
    }

    #[test]
    fn test_nan_is_treated_as_missing() {
        let s = NormalizationStats::from_values([1.0, f64::NAN, 3.0]);
        assert_eq!(s, NormalizationStats { min: 1.0, max: 3.0 });
        assert_eq!(s.normalise(Some(f64::NAN), Direction::Direct), 0.0);
    }

    #[test]
    fn test_bounds_and_monotonicity() {
        let raw = [3.1, 3.9, 3.4, 3.65, 3.2];
        let s = NormalizationStats::from_values(raw);
        let mut sorted = raw;
        sorted.sort_by(f64::total_cmp);

        let direct: Vec<f64> = sorted.iter().map(|v| s.normalise(Some(*v), Direction::Direct)).collect();
        let inverse: Vec<f64> = sorted.iter().map(|v| s.normalise(Some(*v), Direction::Inverse)).collect();

        for n in direct.iter().chain(inverse.iter()) {
            assert!((0.0..=1.0).contains(n), "{n} out of bounds");
        }
        assert!(direct.windows(2).all(|w| w[0] <= w[1]));
        assert!(inverse.windows(2).all(|w| w[0] >= w[1]));
    }
}
