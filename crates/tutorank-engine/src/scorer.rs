// Scoring engine - five normalized sub-scores, weighted sum, hard filters, stable top-k

use crate::config::{check_weight, NormalizationConfig, ScoringConfig, ScoringWeights};
use crate::contributor::{CommentAnalyzer, ScoreContributor};
use crate::error::EngineError;
use crate::query_builder::ScoringFilters;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use tutorank_core::{CandidateVideo, DurationBucket, DurationPreference, ScoreBreakdown, ScoredVideo};

const SECONDS_PER_DAY: f64 = 86_400.0;

// clamp into [0,1], anything non-finite counts as 0
fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// 1 / rank. Rank 0 is treated as rank 1.
pub fn relevance_score(search_rank: u32) -> f64 {
    unit(1.0 / search_rank.max(1) as f64)
}

/// likes per view. A video without views gets 0 whatever its like count says.
pub fn like_ratio_score(view_count: i64, like_count: i64) -> f64 {
    if view_count <= 0 || like_count <= 0 {
        return 0.0;
    }
    unit(like_count as f64 / view_count as f64)
}

/// log(1 + views) / log(1 + reference_scale)
pub fn view_score(view_count: i64, reference_scale: u64) -> f64 {
    if view_count <= 0 || reference_scale == 0 {
        return 0.0;
    }
    let max_log = (reference_scale as f64).ln_1p();
    unit((view_count as f64).ln_1p() / max_log)
}

/// Exponential decay on age: 1.0 when new, 0.5 after one half-life.
/// Publication times in the future count as age 0.
pub fn recency_score(published_at: DateTime<Utc>, now: DateTime<Utc>, half_life_days: f64) -> f64 {
    let age_days = ((now - published_at).num_seconds() as f64 / SECONDS_PER_DAY).max(0.0);
    unit(0.5f64.powf(age_days / half_life_days))
}

/// Categorical match: exact bucket 1.0, neighbouring bucket `adjacent_credit`, otherwise 0
pub fn duration_match_score(
    duration_seconds: i64,
    preference: DurationPreference,
    adjacent_credit: f64,
) -> f64 {
    let Some(wanted) = preference.bucket() else {
        return 1.0;
    };

    match DurationBucket::from_seconds(duration_seconds).distance(&wanted) {
        0 => 1.0,
        1 => unit(adjacent_credit),
        _ => 0.0,
    }
}

// weighted extra contributor
struct WeightedContributor {
    contributor: Box<dyn ScoreContributor>,
    weight: f64,
}

/// Scores and ranks candidate batches. Holds its weights read-only, so one
/// engine can serve concurrent callers.
pub struct ScoringEngine {
    weights: ScoringWeights,
    normalization: NormalizationConfig,
    contributions: Vec<WeightedContributor>,
}

impl ScoringEngine {
    pub fn new(
        weights: ScoringWeights,
        normalization: NormalizationConfig,
    ) -> Result<Self, EngineError> {
        weights.validate()?;
        normalization.validate()?;

        Ok(Self {
            weights,
            normalization,
            contributions: Vec::new(),
        })
    }

    /// Engine for a loaded config, including the comment analyzer when enabled
    pub fn from_config(config: &ScoringConfig) -> Result<Self, EngineError> {
        let mut engine = Self::new(config.weights, config.normalization)?;
        if config.comment_analysis.enabled {
            engine = engine.with_contributor(
                Box::new(CommentAnalyzer::new(true)),
                config.comment_analysis.weight,
            )?;
        }
        Ok(engine)
    }

    /// Register an additional factor with its weight
    pub fn with_contributor(
        mut self,
        contributor: Box<dyn ScoreContributor>,
        weight: f64,
    ) -> Result<Self, EngineError> {
        check_weight(contributor.name(), weight)?;
        self.contributions
            .push(WeightedContributor { contributor, weight });
        Ok(self)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn normalization(&self) -> &NormalizationConfig {
        &self.normalization
    }

    /// Upper bound of the composite score
    pub fn max_score(&self) -> f64 {
        self.weights.sum()
            + self
                .active_contributions()
                .map(|c| c.weight)
                .sum::<f64>()
    }

    fn active_contributions(&self) -> impl Iterator<Item = &WeightedContributor> {
        self.contributions
            .iter()
            .filter(|c| c.contributor.is_enabled())
    }

    /// Score against the current time
    pub fn score(
        &self,
        candidates: &[CandidateVideo],
        filters: &ScoringFilters,
        top_k: usize,
    ) -> Result<Vec<ScoredVideo>, EngineError> {
        self.score_at(candidates, filters, top_k, Utc::now())
    }

    /// Filter, score, rank and truncate a batch as of `now`
    pub fn score_at(
        &self,
        candidates: &[CandidateVideo],
        filters: &ScoringFilters,
        top_k: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredVideo>, EngineError> {
        if top_k < 1 {
            return Err(EngineError::request("top_k must be at least 1"));
        }

        // hard recency cutoff, before any scoring
        let cutoff = filters.published_after(now);
        let survivors: Vec<&CandidateVideo> = candidates
            .iter()
            .filter(|c| cutoff.map_or(true, |min| c.published_at >= min))
            .collect();

        let mut ranked: Vec<ScoredVideo> = survivors
            .iter()
            .map(|video| {
                let breakdown = self.breakdown(video, filters.duration_preference, now);
                let score = self.composite(&breakdown);
                debug!(
                    video_id = %video.video_id,
                    rank = video.search_rank,
                    score,
                    relevance = breakdown.relevance,
                    like_ratio = breakdown.like_ratio,
                    views = breakdown.views,
                    recency = breakdown.recency,
                    duration_match = breakdown.duration_match,
                    "Candidate scored"
                );
                ScoredVideo {
                    video: (*video).clone(),
                    score,
                    breakdown,
                }
            })
            .collect();

        // sort_by is stable: equal scores keep upstream order
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked.truncate(top_k);

        info!(
            candidates = candidates.len(),
            filtered_out = candidates.len() - survivors.len(),
            returned = ranked.len(),
            "Batch ranked"
        );
        Ok(ranked)
    }

    /// The sub-scores of one candidate
    pub fn breakdown(
        &self,
        video: &CandidateVideo,
        preference: DurationPreference,
        now: DateTime<Utc>,
    ) -> ScoreBreakdown {
        if video.view_count < 0 || video.like_count < 0 || video.duration_seconds < 0 {
            warn!(
                video_id = %video.video_id,
                views = video.view_count,
                likes = video.like_count,
                duration = video.duration_seconds,
                "Negative metadata clamped to zero"
            );
        }
        if video.search_rank == 0 {
            warn!(video_id = %video.video_id, "Search rank 0 treated as rank 1");
        }

        let norm = &self.normalization;
        let mut extra = BTreeMap::new();
        let mut notes = BTreeMap::new();
        for c in self.active_contributions() {
            let result = c.contributor.score(video);
            let name = c.contributor.name().to_string();
            if let Some(note) = result.note() {
                notes.insert(name.clone(), note);
            }
            extra.insert(name, unit(result.score));
        }

        ScoreBreakdown {
            relevance: relevance_score(video.search_rank),
            like_ratio: like_ratio_score(video.view_count, video.like_count),
            views: view_score(video.view_count, norm.view_reference_scale),
            recency: recency_score(video.published_at, now, norm.recency_half_life_days),
            duration_match: duration_match_score(
                video.duration_seconds,
                preference,
                norm.adjacent_duration_credit,
            ),
            extra,
            notes,
        }
    }

    /// Weighted sum of a breakdown
    pub fn composite(&self, breakdown: &ScoreBreakdown) -> f64 {
        let w = &self.weights;
        let base = w.relevance * breakdown.relevance
            + w.like_ratio * breakdown.like_ratio
            + w.views * breakdown.views
            + w.recency * breakdown.recency
            + w.duration_match * breakdown.duration_match;

        let extra: f64 = self
            .active_contributions()
            .map(|c| {
                let value = breakdown
                    .extra
                    .get(c.contributor.name())
                    .copied()
                    .unwrap_or(0.0);
                c.weight * value
            })
            .sum();

        base + extra
    }
}

/// One-shot scoring with explicit weights and the default normalization constants
pub fn score_candidates(
    candidates: &[CandidateVideo],
    filters: &ScoringFilters,
    weights: &ScoringWeights,
    top_k: usize,
) -> Result<Vec<ScoredVideo>, EngineError> {
    ScoringEngine::new(*weights, NormalizationConfig::default())?.score(candidates, filters, top_k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contributor::ContributorScore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn video(id: &str, rank: u32, views: i64, likes: i64, duration: i64, age_days: i64) -> CandidateVideo {
        CandidateVideo {
            video_id: id.to_string(),
            title: format!("Video {}", id),
            channel: "Channel".to_string(),
            thumbnail: String::new(),
            duration_seconds: duration,
            view_count: views,
            like_count: likes,
            published_at: now() - Duration::days(age_days),
            search_rank: rank,
        }
    }

    fn engine() -> ScoringEngine {
        ScoringEngine::new(ScoringWeights::default(), NormalizationConfig::default()).unwrap()
    }

    #[test]
    fn test_relevance_curve() {
        assert_eq!(relevance_score(1), 1.0);
        assert_eq!(relevance_score(2), 0.5);
        assert_eq!(relevance_score(4), 0.25);
        assert_eq!(relevance_score(0), 1.0);
        assert!(relevance_score(999) > 0.0);
    }

    #[test]
    fn test_like_ratio() {
        assert_eq!(like_ratio_score(1_000_000, 50_000), 0.05);
        assert_eq!(like_ratio_score(0, 0), 0.0);
        assert_eq!(like_ratio_score(0, 500), 0.0);
        // inconsistent upstream data is clamped
        assert_eq!(like_ratio_score(10, 500), 1.0);
        assert_eq!(like_ratio_score(100, -3), 0.0);
        assert_eq!(like_ratio_score(-100, 3), 0.0);
    }

    #[test]
    fn test_view_score_log_scale() {
        assert_eq!(view_score(0, 10_000_000), 0.0);
        assert_eq!(view_score(-7, 10_000_000), 0.0);
        assert_eq!(view_score(10_000_000, 10_000_000), 1.0);
        assert_eq!(view_score(50_000_000, 10_000_000), 1.0);

        let small = view_score(1_000, 10_000_000);
        let large = view_score(1_000_000, 10_000_000);
        assert!(small > 0.0 && small < large && large < 1.0);
        // log scale: a thousand views still counts for something
        assert!(small > 0.4);
    }

    #[test]
    fn test_recency_decay() {
        let now = now();
        assert_eq!(recency_score(now, now, 365.0), 1.0);
        assert_eq!(recency_score(now + Duration::days(30), now, 365.0), 1.0);

        let one_year = recency_score(now - Duration::days(365), now, 365.0);
        assert!((one_year - 0.5).abs() < 1e-9);

        let ten_days = recency_score(now - Duration::days(10), now, 365.0);
        assert!(ten_days > 0.98);

        let five_years = recency_score(now - Duration::days(5 * 365), now, 365.0);
        assert!(five_years < 0.05);
    }

    #[test]
    fn test_duration_match() {
        let five_min = 5 * 60;
        assert_eq!(duration_match_score(five_min, DurationPreference::Short, 0.5), 1.0);
        assert_eq!(duration_match_score(five_min, DurationPreference::Medium, 0.5), 0.5);
        assert_eq!(duration_match_score(five_min, DurationPreference::Long, 0.5), 0.0);
        assert_eq!(duration_match_score(five_min, DurationPreference::Any, 0.5), 1.0);

        // 31 minutes is a near miss for medium
        assert_eq!(duration_match_score(31 * 60, DurationPreference::Medium, 0.5), 0.5);
        assert_eq!(duration_match_score(0, DurationPreference::Short, 0.5), 1.0);
        assert_eq!(duration_match_score(-60, DurationPreference::Long, 0.5), 0.0);
    }

    #[test]
    fn test_zero_metadata_does_not_fail() {
        let batch = vec![video("empty", 1, 0, 0, 0, 0)];
        let result = engine()
            .score_at(&batch, &ScoringFilters::default(), 3, now())
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].breakdown.like_ratio, 0.0);
        assert_eq!(result[0].breakdown.views, 0.0);
    }

    #[test]
    fn test_top_k_zero_rejected() {
        let err = engine()
            .score_at(&[], &ScoringFilters::default(), 0, now())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = ScoringWeights {
            views: -0.1,
            ..ScoringWeights::default()
        };
        let err = ScoringEngine::new(weights, NormalizationConfig::default()).err().unwrap();
        assert!(matches!(err, EngineError::InvalidConfiguration(_)));

        let err = engine()
            .with_contributor(Box::new(CommentAnalyzer::new(true)), -1.0)
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_contributor_adds_to_composite() {
        let engine = engine()
            .with_contributor(Box::new(CommentAnalyzer::new(true)), 0.1)
            .unwrap();
        let batch = vec![video("a", 1, 100, 10, 300, 0)];
        let result = engine.score_at(&batch, &ScoringFilters::default(), 1, now()).unwrap();

        let b = &result[0].breakdown;
        assert_eq!(b.extra.get("comment_quality"), Some(&1.0));
        let base = ScoringEngine::new(ScoringWeights::default(), NormalizationConfig::default())
            .unwrap()
            .composite(b);
        assert!((result[0].score - (base + 0.1)).abs() < 1e-12);
        assert!((engine.max_score() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_disabled_contributor_ignored() {
        let engine = engine()
            .with_contributor(Box::new(CommentAnalyzer::new(false)), 0.5)
            .unwrap();
        let batch = vec![video("a", 1, 100, 10, 300, 0)];
        let result = engine.score_at(&batch, &ScoringFilters::default(), 1, now()).unwrap();

        assert!(result[0].breakdown.extra.is_empty());
        assert!((engine.max_score() - 1.0).abs() < 1e-12);
    }

    // flags anything with hardly any likes
    struct LowEngagement;

    impl ScoreContributor for LowEngagement {
        fn name(&self) -> &'static str {
            "engagement"
        }

        fn score(&self, video: &CandidateVideo) -> ContributorScore {
            if video.like_count < 5 {
                ContributorScore::new(-3.0)
                    .with_flag("low_engagement")
                    .with_reason("fewer than 5 likes")
            } else {
                ContributorScore::new(0.9)
            }
        }
    }

    #[test]
    fn test_contributor_notes_in_breakdown() {
        let engine = engine()
            .with_contributor(Box::new(LowEngagement), 0.2)
            .unwrap();
        let batch = vec![video("liked", 1, 100, 50, 300, 0), video("ignored", 2, 100, 1, 300, 0)];
        let result = engine.score_at(&batch, &ScoringFilters::default(), 2, now()).unwrap();

        let liked = &result[0].breakdown;
        assert_eq!(liked.extra.get("engagement"), Some(&0.9));
        assert!(liked.notes.is_empty());

        let ignored = &result[1].breakdown;
        // out of range contributor output is clamped like any sub-score
        assert_eq!(ignored.extra.get("engagement"), Some(&0.0));
        let note = &ignored.notes["engagement"];
        assert_eq!(note.flags, vec!["low_engagement"]);
        assert_eq!(note.reason.as_deref(), Some("fewer than 5 likes"));
    }

    #[test]
    fn test_one_shot_scoring() {
        let batch = vec![video("b", 2, 10, 1, 300, 5), video("a", 1, 10, 1, 300, 5)];
        let result = score_candidates(&batch, &ScoringFilters::default(), &ScoringWeights::default(), 3)
            .unwrap();
        assert_eq!(result[0].video.video_id, "a");
    }
}
