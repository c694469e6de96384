//! Aggregation of crowdsourced weight submissions.
//!
//! Every group (each submitter role, plus "overall") reduces its members'
//! weights to a per-attribute median. Medians can't be maintained from a
//! running total, so every call recomputes from the full submission set.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use medrank_common::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::attributes::Attribute;
use crate::roles;
use crate::weights::WeightVector;

/// Identifier of the group spanning every submission. Not usable as a role code.
pub const OVERALL_ID: &str = "overall";

/// One submission as stored upstream; keys are not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSubmission {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub weights: serde_json::Map<String, Value>,
}

/// A validated submission. Attributes the submitter omitted are absent,
/// which is different from a weight of 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightSubmission {
    pub role: Option<String>,
    pub weights: BTreeMap<Attribute, f64>,
}

impl WeightSubmission {
    /// An empty role, or the reserved [`OVERALL_ID`], is stored as no role.
    pub fn new(role: Option<&str>) -> Self {
        Self {
            role: role.filter(|r| !r.is_empty() && *r != OVERALL_ID).map(str::to_string),
            weights: BTreeMap::new(),
        }
    }

    pub fn with(mut self, attr: Attribute, weight: f64) -> Self {
        self.weights.insert(attr, weight);
        self
    }

    /// Keep registry attributes with numeric values in 0..=100; drop the rest.
    pub fn from_raw(raw: &RawSubmission) -> Self {
        if raw.role.as_deref() == Some(OVERALL_ID) {
            debug!("Ignoring reserved role code in submission");
        }
        let mut submission = Self::new(raw.role.as_deref());
        for (key, value) in &raw.weights {
            match (Attribute::from_key(key), value.as_f64().filter(|v| (0.0..=100.0).contains(v))) {
                (Ok(attr), Some(weight)) => {
                    submission.weights.insert(attr, weight);
                }
                (Err(_), _) => debug!(key = %key, "Ignoring unknown attribute in submission"),
                (Ok(_), None) => debug!(key = %key, "Ignoring non-numeric or out-of-range submission weight"),
            }
        }
        submission
    }
}

/// Parse a JSON array of raw submissions and validate each one.
pub fn submissions_from_json_str(json: &str) -> Result<Vec<WeightSubmission>> {
    let raw: Vec<RawSubmission> = serde_json::from_str(json)?;
    Ok(raw.iter().map(WeightSubmission::from_raw).collect())
}

pub fn submissions_from_json_path(path: impl AsRef<Path>) -> Result<Vec<WeightSubmission>> {
    let content = std::fs::read_to_string(path)?;
    submissions_from_json_str(&content)
}

/// A named set of submissions. `Overall` admits every submission.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Overall,
    Role(String),
}

impl Group {
    pub fn admits(&self, submission: &WeightSubmission) -> bool {
        match self {
            Group::Overall => true,
            Group::Role(role) => submission.role.as_deref() == Some(role.as_str()),
        }
    }

    /// Stable identifier: `"overall"` or the role code.
    pub fn id(&self) -> &str {
        match self {
            Group::Overall => OVERALL_ID,
            Group::Role(role) => role.as_str(),
        }
    }

    /// Resolve an identifier produced by [`Group::id`].
    pub fn from_id(id: &str) -> Self {
        match id {
            OVERALL_ID => Group::Overall,
            role => Group::Role(role.to_string()),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Overall => f.write_str("All"),
            Group::Role(role) => f.write_str(roles::display_label(role)),
        }
    }
}

/// Representative weighting of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateWeightVector {
    pub group: Group,
    pub weights: WeightVector,
    pub count: usize,
}

impl AggregateWeightVector {
    /// e.g. `"All (12)"`, `"Medical school faculty member (3)"`.
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.group, self.count)
    }
}

/// Median of the values; mean of the middle pair for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Groups present in the submission set: overall first, then roles by code.
pub fn groups_for(submissions: &[WeightSubmission]) -> Vec<Group> {
    let roles: BTreeSet<&str> = submissions.iter().filter_map(|s| s.role.as_deref()).collect();
    std::iter::once(Group::Overall)
        .chain(roles.into_iter().map(|r| Group::Role(r.to_string())))
        .collect()
}

/// Aggregate one group, or `None` if it has no members.
pub fn aggregate_group(group: Group, submissions: &[WeightSubmission]) -> Option<AggregateWeightVector> {
    let members: Vec<&WeightSubmission> = submissions.iter().filter(|s| group.admits(s)).collect();
    if members.is_empty() {
        return None;
    }

    let weights: BTreeMap<Attribute, f64> = Attribute::ALL
        .iter()
        .filter_map(|&attr| {
            let values: Vec<f64> = members.iter().filter_map(|s| s.weights.get(&attr).copied()).collect();
            median(&values).map(|m| (attr, m))
        })
        .collect();

    Some(AggregateWeightVector {
        group,
        weights: WeightVector::from_map_unchecked(weights),
        count: members.len(),
    })
}

/// Aggregate every group from scratch.
pub fn aggregate(submissions: &[WeightSubmission]) -> Vec<AggregateWeightVector> {
    let aggregates: Vec<AggregateWeightVector> = groups_for(submissions)
        .into_iter()
        .filter_map(|g| aggregate_group(g, submissions))
        .collect();
    info!(
        submissions = submissions.len(),
        groups = aggregates.len(),
        "Recomputed aggregate weights"
    );
    aggregates
}

/// Find the aggregate for a group identifier (`"overall"` or a role code).
pub fn find<'a>(aggregates: &'a [AggregateWeightVector], id: &str) -> Option<&'a AggregateWeightVector> {
    let group = Group::from_id(id);
    aggregates.iter().find(|a| a.group == group)
}
