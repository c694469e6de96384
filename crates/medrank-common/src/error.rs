use thiserror::Error;

/// Errors raised by the ranking engine and its loaders.
///
/// Missing or malformed attribute values are never errors; they are
/// handled by the normaliser's worst-case substitution. Only contract
/// violations and boundary I/O failures end up here.
#[derive(Debug, Error)]
pub enum MedrankError {
    #[error("Unknown attribute key: {0}")]
    UnknownAttribute(String),

    #[error("Weight for '{key}' must be within 0..=100, got {value}")]
    WeightOutOfRange { key: String, value: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MedrankError>;
