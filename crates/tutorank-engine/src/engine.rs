// Recommender
// Orchestrates: Request validation -> Query building -> Scoring -> Top-k

use crate::config::ScoringConfig;
use crate::error::EngineError;
use crate::query_builder::{BuiltQuery, QueryBuilder};
use crate::scorer::ScoringEngine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use tutorank_core::{CandidateVideo, ScoredVideo, SearchRequest};

// ranked result for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub query: String,
    pub recommendations: Vec<ScoredVideo>,
}

// main recommendation engine
pub struct Recommender {
    config: ScoringConfig,
    query_builder: QueryBuilder,
    scorer: ScoringEngine,
}

impl Recommender {
    pub fn new(config: ScoringConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let scorer = ScoringEngine::from_config(&config)?;

        Ok(Self {
            config,
            query_builder: QueryBuilder::new(),
            scorer,
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn scorer(&self) -> &ScoringEngine {
        &self.scorer
    }

    /// Search string and filters for a request (what the fetch layer needs)
    pub fn build_query(&self, request: &SearchRequest) -> Result<BuiltQuery, EngineError> {
        self.query_builder.build(request)
    }

    /// Rank already-fetched candidates for a request.
    /// `top_k` falls back to the configured default.
    pub fn recommend(
        &self,
        request: &SearchRequest,
        candidates: &[CandidateVideo],
        top_k: Option<usize>,
    ) -> Result<Recommendations, EngineError> {
        self.recommend_at(request, candidates, top_k, Utc::now())
    }

    pub fn recommend_at(
        &self,
        request: &SearchRequest,
        candidates: &[CandidateVideo],
        top_k: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<Recommendations, EngineError> {
        let built = self.query_builder.build(request)?;
        let top_k = top_k.unwrap_or(self.config.results.top_k);

        info!(
            query = %built.search_query,
            candidates = candidates.len(),
            top_k,
            "Recommend request"
        );

        let recommendations = self.scorer.score_at(candidates, &built.filters, top_k, now)?;

        Ok(Recommendations {
            query: built.search_query,
            recommendations,
        })
    }
}
