// Tutorank engine - turns a learning request + fetched candidates into a ranked short-list

pub mod config;
pub mod contributor;
pub mod engine;
pub mod error;
pub mod query_builder;
pub mod scorer;

pub use config::{load_config, NormalizationConfig, ScoringConfig, ScoringWeights};
pub use contributor::{CommentAnalyzer, ContributorScore, ScoreContributor};
pub use engine::{Recommendations, Recommender};
pub use error::EngineError;
pub use query_builder::{build_query, BuiltQuery, QueryBuilder, ScoringFilters};
pub use scorer::{score_candidates, ScoringEngine};
