//! Configuration parsing for scoring weights and normalization constants

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Default config location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/scoring.toml";

// Effective config, immutable after load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub normalization: NormalizationConfig,
    pub results: ResultsConfig,
    pub comment_analysis: CommentAnalysisConfig,
}

/// Weight of each factor in the composite score.
/// Applied as given, the engine does not renormalize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub relevance: f64,
    pub like_ratio: f64,
    pub views: f64,
    pub recency: f64,
    pub duration_match: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            relevance: 0.30,
            like_ratio: 0.25,
            views: 0.20,
            recency: 0.15,
            duration_match: 0.10,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.relevance + self.like_ratio + self.views + self.recency + self.duration_match
    }

    // named view, same order as the breakdown keys
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("relevance", self.relevance),
            ("like_ratio", self.like_ratio),
            ("views", self.views),
            ("recency", self.recency),
            ("duration_match", self.duration_match),
        ]
    }

    /// Every weight must be a finite, non-negative number
    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, value) in self.entries() {
            check_weight(name, value)?;
        }
        Ok(())
    }
}

pub(crate) fn check_weight(name: &str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::config(format!(
            "weight '{}' must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

// Constants that shape the normalization curves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationConfig {
    // view count that maps to a views score of 1.0
    #[serde(default = "default_view_reference_scale")]
    pub view_reference_scale: u64,

    // age in days at which the recency score halves
    #[serde(default = "default_half_life_days")]
    pub recency_half_life_days: f64,

    // duration match credit for a neighbouring bucket (short<->medium, medium<->long)
    #[serde(default = "default_adjacent_credit")]
    pub adjacent_duration_credit: f64,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            view_reference_scale: default_view_reference_scale(),
            recency_half_life_days: default_half_life_days(),
            adjacent_duration_credit: default_adjacent_credit(),
        }
    }
}

impl NormalizationConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.view_reference_scale == 0 {
            return Err(EngineError::config("view_reference_scale must be positive"));
        }
        if !self.recency_half_life_days.is_finite() || self.recency_half_life_days <= 0.0 {
            return Err(EngineError::config(format!(
                "recency_half_life_days must be positive, got {}",
                self.recency_half_life_days
            )));
        }
        if !(0.0..=1.0).contains(&self.adjacent_duration_credit) {
            return Err(EngineError::config(format!(
                "adjacent_duration_credit must be within [0, 1], got {}",
                self.adjacent_duration_credit
            )));
        }
        Ok(())
    }
}

// result count defaults
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultsConfig {
    // how many recommendations to return
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    // how many search results the fetch layer should ask for
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentAnalysisConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub weight: f64,
}

// on-disk layout; weights are all-or-nothing so they come in as options
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    weights: Option<RawWeights>,

    #[serde(default)]
    normalization: NormalizationConfig,

    #[serde(default)]
    results: ResultsConfig,

    #[serde(default)]
    comment_analysis: CommentAnalysisConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWeights {
    relevance: Option<f64>,
    like_ratio: Option<f64>,
    views: Option<f64>,
    recency: Option<f64>,
    duration_match: Option<f64>,
}

impl RawWeights {
    fn into_weights(self) -> Result<ScoringWeights, EngineError> {
        let required = |name: &str, value: Option<f64>| {
            value.ok_or_else(|| EngineError::config(format!("missing weight '{}'", name)))
        };

        Ok(ScoringWeights {
            relevance: required("relevance", self.relevance)?,
            like_ratio: required("like_ratio", self.like_ratio)?,
            views: required("views", self.views)?,
            recency: required("recency", self.recency)?,
            duration_match: required("duration_match", self.duration_match)?,
        })
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            normalization: NormalizationConfig::default(),
            results: ResultsConfig::default(),
            comment_analysis: CommentAnalysisConfig::default(),
        }
    }
}

impl ScoringConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, EngineError> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| EngineError::config(format!("malformed config: {}", e)))?;

        let weights = match raw.weights {
            Some(w) => w.into_weights()?,
            None => ScoringWeights::default(),
        };

        let config = Self {
            weights,
            normalization: raw.normalization,
            results: raw.results,
            comment_analysis: raw.comment_analysis,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.weights.validate()?;
        self.normalization.validate()?;
        check_weight("comment_analysis", self.comment_analysis.weight)?;

        if self.results.top_k < 1 {
            return Err(EngineError::config("results.top_k must be at least 1"));
        }
        if self.results.max_results < 1 {
            return Err(EngineError::config("results.max_results must be at least 1"));
        }
        Ok(())
    }

    /// Load from `path` when the file exists, otherwise fall back to the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No scoring config found, using defaults");
            return Ok(Self::default());
        }
        load_config(path)
    }
}

// defualt value helpers for serde
fn default_view_reference_scale() -> u64 {
    10_000_000
}

fn default_half_life_days() -> f64 {
    365.0
}

fn default_adjacent_credit() -> f64 {
    0.5
}

fn default_top_k() -> usize {
    3
}

fn default_max_results() -> usize {
    15
}

// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ScoringConfig, EngineError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        EngineError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    let config = ScoringConfig::from_toml_str(&content)?;
    info!(path = %path.display(), weight_sum = config.weights.sum(), "Scoring config loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        let toml_content = r#"
[weights]
relevance = 0.4
like_ratio = 0.2
views = 0.2
recency = 0.1
duration_match = 0.1

[normalization]
view_reference_scale = 1000000
recency_half_life_days = 180.0

[results]
top_k = 5

[comment_analysis]
enabled = true
weight = 0.05
"#;
        let config = ScoringConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.weights.relevance, 0.4);
        assert_eq!(config.normalization.view_reference_scale, 1_000_000);
        assert_eq!(config.normalization.adjacent_duration_credit, 0.5);
        assert_eq!(config.results.top_k, 5);
        assert_eq!(config.results.max_results, 15);
        assert!(config.comment_analysis.enabled);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = ScoringConfig::from_toml_str("").unwrap();
        assert_eq!(config, ScoringConfig::default());
        assert!((config.weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_weights_rejected() {
        let err = ScoringConfig::from_toml_str("[weights]\nrelevance = 1.0\n").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("like_ratio"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let toml_content = r#"
[weights]
relevance = 0.3
like_ratio = -0.25
views = 0.2
recency = 0.15
duration_match = 0.1
"#;
        let err = ScoringConfig::from_toml_str(toml_content).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_bad_normalization_rejected() {
        assert!(ScoringConfig::from_toml_str("[normalization]\nview_reference_scale = 0\n").is_err());
        assert!(ScoringConfig::from_toml_str("[normalization]\nrecency_half_life_days = 0.0\n").is_err());
        assert!(ScoringConfig::from_toml_str("[normalization]\nadjacent_duration_credit = 1.5\n").is_err());
        assert!(ScoringConfig::from_toml_str("[results]\ntop_k = 0\n").is_err());
    }

    #[test]
    fn test_unsummed_weights_accepted() {
        // the engine applies weights as given, no sum check
        let toml_content = r#"
[weights]
relevance = 1.0
like_ratio = 1.0
views = 1.0
recency = 1.0
duration_match = 1.0
"#;
        let config = ScoringConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.weights.sum(), 5.0);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = ScoringConfig::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(config, ScoringConfig::default());

        let err = load_config("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration(_)));
    }
}
