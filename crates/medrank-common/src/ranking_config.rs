//! Run configuration for the ranking engine.
//!
//! Users describe a ranking run (dataset location, cost view, weights,
//! submission source, output options) in a TOML or YAML file. Weights stay
//! keyed by raw attribute strings here; the ranker validates them against
//! its attribute registry when it builds a weight vector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{MedrankError, Result};

/// Complete ranking run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Where the school records come from
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Attribute key -> integer percentage
    #[serde(default = "default_weights")]
    pub weights: BTreeMap<String, u32>,

    /// Crowdsourced weight submissions
    #[serde(default)]
    pub submissions: SubmissionsConfig,

    /// Output options
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            weights: default_weights(),
            submissions: SubmissionsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// Which cost figures feed the Finances attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostView {
    #[default]
    InState,
    OutOfState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to a CSV or JSON dataset
    #[serde(default = "default_dataset_path")]
    pub path: String,

    #[serde(default)]
    pub cost_view: CostView,
}

fn default_dataset_path() -> String { "data/schools.json".to_string() }

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            cost_view: CostView::InState,
        }
    }
}

// ── Weights ───────────────────────────────────────────────────────────────────

/// The product's default weighting. Sums to 100.
pub fn default_weights() -> BTreeMap<String, u32> {
    [
        ("Average GPA", 20),
        ("Average MCAT", 20),
        ("NIH Research Funding", 15),
        ("NIH Research Funding per Faculty", 10),
        ("Average Graduate Indebtedness", 10),
        ("Total Cost of Attendance", 10),
        ("Tuition and Fees", 5),
        ("#n_ranked_specialties", 5),
        ("#n_top10_specialties", 5),
        ("URM%", 0),
        ("Class Size", 0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

// ── Submissions ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionsConfig {
    /// JSON array of `{ role, weights }` records
    pub path: Option<String>,

    /// Poll interval used by `medrank aggregate --watch`
    #[serde(default = "default_poll_secs")]
    pub poll_interval_secs: u64,
}

fn default_poll_secs() -> u64 { 5 }

impl Default for SubmissionsConfig {
    fn default() -> Self {
        Self {
            path: None,
            poll_interval_secs: default_poll_secs(),
        }
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Only print the first N ranked schools
    pub top_n: Option<usize>,

    /// Case-insensitive institution name filter
    pub search: Option<String>,
}

// ── Helper Methods ────────────────────────────────────────────────────────────

impl RankingConfig {
    /// Load from a TOML or YAML file, picked by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(path),
            Some("yaml") | Some("yml") => Self::from_yaml(path),
            other => Err(MedrankError::Config(format!(
                "unsupported config extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }

    /// Load from TOML file
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save to YAML file
    pub fn to_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Sum of all configured weights.
    pub fn total_weight(&self) -> u32 {
        self.weights.values().sum()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
