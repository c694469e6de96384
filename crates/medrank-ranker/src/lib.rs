//! medrank-ranker: medical school ranking engine.
//!
//! Attribute registry -> normaliser -> scorer -> ranker, plus the weight
//! aggregator that turns crowdsourced submissions into representative
//! weightings per submitter role.

pub mod aggregate;
pub mod attributes;
pub mod dataset;
pub mod export;
pub mod normalise;
pub mod pipeline;
pub mod ranker;
pub mod roles;
pub mod scorer;
pub mod weights;

pub use aggregate::{aggregate, AggregateWeightVector, Group, WeightSubmission};
pub use attributes::{Attribute, AttributeDefinition, Category, Direction};
pub use dataset::{Dataset, SchoolRecord};
pub use medrank_common::CostView;
pub use normalise::NormalizationStats;
pub use pipeline::{rank, run, search, RankingRun};
pub use ranker::{ScoredRecord, TIE_EPSILON};
pub use weights::WeightVector;
