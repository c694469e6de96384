//! Configuration loading for medrank.
//! Resolves the run config from `--config`, the MEDRANK_CONFIG env var, or
//! medrank.toml in the current directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use medrank_common::{CostView, OutputFormat, RankingConfig};
use medrank_ranker::WeightVector;

pub const CONFIG_ENV: &str = "MEDRANK_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "medrank.toml";

/// Pick the config path: explicit flag, then env var, then the default file name.
pub fn resolve_path(flag: Option<&Path>, env: Option<String>) -> PathBuf {
    match (flag, env) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(env)) if !env.is_empty() => PathBuf::from(env),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// Load the run configuration.
///
/// A missing file is not an error: defaults are used and a warning logged.
/// A file that exists but fails to parse is.
pub fn load(flag: Option<&Path>) -> anyhow::Result<RankingConfig> {
    let path = resolve_path(flag, std::env::var(CONFIG_ENV).ok());

    if !path.exists() {
        tracing::warn!(
            path = %path.display(),
            "Config file not found, using defaults"
        );
        return Ok(RankingConfig::default());
    }

    let config = RankingConfig::load(&path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        dataset = %config.dataset.path,
        total_weight = config.total_weight(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Command-line overrides applied on top of the loaded config.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dataset: Option<PathBuf>,
    pub out_of_state: bool,
    pub top_n: Option<usize>,
    pub search: Option<String>,
    pub format: Option<OutputFormat>,
}

pub fn apply_overrides(config: &mut RankingConfig, overrides: Overrides) {
    if let Some(path) = overrides.dataset {
        config.dataset.path = path.display().to_string();
    }
    if overrides.out_of_state {
        config.dataset.cost_view = CostView::OutOfState;
    }
    if overrides.top_n.is_some() {
        config.output.top_n = overrides.top_n;
    }
    if overrides.search.is_some() {
        config.output.search = overrides.search;
    }
    if let Some(format) = overrides.format {
        config.output.format = format;
    }
}

/// Validate the config's weights against the attribute registry.
pub fn weights(config: &RankingConfig) -> anyhow::Result<WeightVector> {
    WeightVector::from_keyed(&config.weights).context("invalid [weights] section")
}

/// Read a weight vector exported as JSON (`{"Average GPA": 30, ...}`).
pub fn weights_from_file(path: &Path) -> anyhow::Result<WeightVector> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read weights {}", path.display()))?;
    WeightVector::from_json(&content).with_context(|| format!("invalid weights in {}", path.display()))
}

mod tests;
