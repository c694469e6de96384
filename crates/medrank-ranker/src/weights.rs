//! Weight vector for composite scoring.
//!
//! Weights are percentages in 0..=100 keyed by registry attribute. The
//! engine never requires them to sum to 100: scoring is a weighted sum,
//! so any total is valid. [`WeightVector::is_submittable`] and
//! [`WeightVector::rescale_to_100`] exist for callers that want the
//! product's "100%" convention.

use std::collections::BTreeMap;

use medrank_common::{MedrankError, Result};
use serde::{Deserialize, Serialize};

use crate::attributes::Attribute;

/// Attribute -> percentage. Absent keys weigh 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct WeightVector {
    weights: BTreeMap<Attribute, f64>,
}

impl WeightVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from registry attributes and integer percentages.
    pub fn from_percentages(entries: impl IntoIterator<Item = (Attribute, u32)>) -> Result<Self> {
        let mut w = Self::new();
        for (attr, pct) in entries {
            w.set(attr, f64::from(pct))?;
        }
        Ok(w)
    }

    /// Build from raw string keys, e.g. a config file section.
    ///
    /// Unknown keys are a caller bug and fail with `UnknownAttribute`.
    pub fn from_keyed<V: Copy + Into<f64>>(entries: &BTreeMap<String, V>) -> Result<Self> {
        let mut w = Self::new();
        for (key, &value) in entries {
            w.set(Attribute::from_key(key)?, value.into())?;
        }
        Ok(w)
    }

    /// The product's default weighting.
    pub fn product_default() -> Self {
        // Entries are static and all within range.
        Self::from_keyed(&medrank_common::ranking_config::default_weights())
            .unwrap_or_default()
    }

    /// Set a weight. Must be finite and within 0..=100.
    pub fn set(&mut self, attr: Attribute, value: f64) -> Result<()> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(MedrankError::WeightOutOfRange {
                key: attr.key().to_string(),
                value,
            });
        }
        self.weights.insert(attr, value);
        Ok(())
    }

    pub fn with(mut self, attr: Attribute, value: f64) -> Result<Self> {
        self.set(attr, value)?;
        Ok(self)
    }

    /// Weight for an attribute; 0 when absent.
    pub fn get(&self, attr: Attribute) -> f64 {
        self.weights.get(&attr).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, f64)> + '_ {
        self.weights.iter().map(|(&a, &w)| (a, w))
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Whether the weights add up to exactly 100, the submission target.
    pub fn is_submittable(&self) -> bool {
        (self.total() - 100.0).abs() < 1e-9
    }

    /// Eligible attributes with a positive weight, in registry order.
    pub fn active_attributes(&self) -> Vec<Attribute> {
        self.weights
            .iter()
            .filter(|&(a, &w)| a.is_eligible() && w > 0.0)
            .map(|(&a, _)| a)
            .collect()
    }

    /// Every weight multiplied by `factor`; fails if any leaves 0..=100.
    pub fn scaled(&self, factor: f64) -> Result<Self> {
        let mut out = Self::new();
        for (attr, w) in self.iter() {
            out.set(attr, w * factor)?;
        }
        Ok(out)
    }

    /// Same keys, all zero.
    pub fn zeroed(&self) -> Self {
        Self {
            weights: self.weights.keys().map(|&a| (a, 0.0)).collect(),
        }
    }

    /// Rescale proportionally so the weights are whole percentages summing to 100.
    ///
    /// Each weight becomes `round(w / total * 100)`; the rounding remainder
    /// goes to the largest weight (last in registry order on ties). A zero
    /// total leaves the vector unchanged.
    pub fn rescale_to_100(&self) -> Self {
        let total = self.total();
        if total <= 0.0 {
            return self.clone();
        }

        let mut weights: BTreeMap<Attribute, f64> = self
            .weights
            .iter()
            .map(|(&a, &w)| (a, (w / total * 100.0).round()))
            .collect();

        let diff = 100.0 - weights.values().sum::<f64>();
        if diff != 0.0 {
            let largest = weights
                .iter()
                .fold(None, |best: Option<(Attribute, f64)>, (&a, &w)| match best {
                    Some((_, bw)) if bw > w => best,
                    _ => Some((a, w)),
                })
                .map(|(a, _)| a);
            if let Some(attr) = largest {
                if let Some(w) = weights.get_mut(&attr) {
                    *w += diff;
                }
            }
        }
        Self { weights }
    }

    /// Pretty JSON keyed by attribute column name.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn from_map_unchecked(weights: BTreeMap<Attribute, f64>) -> Self {
        Self { weights }
    }
}

impl TryFrom<BTreeMap<String, f64>> for WeightVector {
    type Error = MedrankError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self> {
        Self::from_keyed(&map)
    }
}

impl From<WeightVector> for BTreeMap<String, f64> {
    fn from(w: WeightVector) -> Self {
        w.weights.into_iter().map(|(a, v)| (a.key().to_string(), v)).collect()
    }
}
