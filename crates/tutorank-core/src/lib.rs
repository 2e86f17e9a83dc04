//! Core types for the tutorial recommender
//! this crate contains the shared data structures passed between the fetch layer,
//! the scoring engine and the serving layer.
pub mod duration;
pub mod youtube;

pub use duration::{format_duration, parse_iso8601_duration, DurationBucket};
pub use youtube::{candidates_from_items, rank_by_search_order, MappingError, VideoItem, UNRANKED_SEARCH_RANK};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// SKILL LEVEL //

/// Skill level the learner asked for. "no level" is modelled as `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// Parse skill level from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "beginners" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" | "expert" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

// DURATION PREFERENCE //

/// Preferred video length. `Any` disables duration matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationPreference {
    Short,
    Medium,
    Long,
    #[default]
    Any,
}

impl DurationPreference {
    /// Parse duration preference from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "short" => Some(Self::Short),
            "medium" => Some(Self::Medium),
            "long" => Some(Self::Long),
            "any" | "" => Some(Self::Any),
            _ => None,
        }
    }

    /// The bucket this preference asks for, `None` for `Any`
    pub fn bucket(&self) -> Option<DurationBucket> {
        match self {
            Self::Short => Some(DurationBucket::Short),
            Self::Medium => Some(DurationBucket::Medium),
            Self::Long => Some(DurationBucket::Long),
            Self::Any => None,
        }
    }
}

// SEARCH REQUEST //

/// Structured learning request as received from the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub technology: String,

    #[serde(default)]
    pub level: Option<SkillLevel>,

    #[serde(default)]
    pub duration_preference: DurationPreference,

    #[serde(default)]
    pub max_months: Option<u32>, // recency cutoff, None = any time
}

impl SearchRequest {
    pub fn new(technology: impl Into<String>) -> Self {
        Self {
            technology: technology.into(),
            level: None,
            duration_preference: DurationPreference::Any,
            max_months: None,
        }
    }

    pub fn with_level(mut self, level: SkillLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_duration(mut self, preference: DurationPreference) -> Self {
        self.duration_preference = preference;
        self
    }

    pub fn with_max_months(mut self, months: u32) -> Self {
        self.max_months = Some(months);
        self
    }
}

// CANDIDATE VIDEO (what the fetch layer hands us)

/// One search result with its metadata, as supplied by the fetch collaborator.
///
/// Counts are signed on purpose: upstream data is not trusted and the engine
/// clamps anything out of range instead of rejecting the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateVideo {
    pub video_id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub channel: String,

    #[serde(default)]
    pub thumbnail: String,

    #[serde(default)]
    pub duration_seconds: i64,

    #[serde(default)]
    pub view_count: i64,

    #[serde(default)]
    pub like_count: i64,

    pub published_at: DateTime<Utc>,

    pub search_rank: u32, // 1-based position in the upstream ordering
}

impl CandidateVideo {
    /// Duration bucket of this video (short / medium / long)
    pub fn bucket(&self) -> DurationBucket {
        DurationBucket::from_seconds(self.duration_seconds)
    }
}

// SCORE BREAKDOWN //

/// The five normalized sub-scores, each in [0,1]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub relevance: f64,
    pub like_ratio: f64,
    pub views: f64,
    pub recency: f64,
    pub duration_match: f64,

    // scores from additional contributors, keyed by contributor name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, f64>,

    // why a contributor scored the way it did, only for contributors that said something
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<String, ContributorNote>,
}

/// Flags and reason a contributor attached to its score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributorNote {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ContributorNote {
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.reason.is_none()
    }
}

// SCORED VIDEO (engine output)

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredVideo {
    pub video: CandidateVideo,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

// VIDEO RECOMMENDATION (wire shape)

/// Flat shape the HTTP response and the UI depend on.
/// Field names and breakdown keys are part of the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecommendation {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub thumbnail: String,
    pub duration: String, // formatted, e.g. "15:30"
    pub duration_seconds: i64,
    pub view_count: i64,
    pub like_count: i64,
    pub published_at: DateTime<Utc>,
    pub score: f64,
    pub score_breakdown: ScoreBreakdown,
}

impl VideoRecommendation {
    /// Round score and breakdown values to `places` decimals for display
    pub fn rounded(mut self, places: i32) -> Self {
        let round = |v: f64| {
            let factor = 10f64.powi(places);
            (v * factor).round() / factor
        };
        self.score = round(self.score);
        let b = &mut self.score_breakdown;
        b.relevance = round(b.relevance);
        b.like_ratio = round(b.like_ratio);
        b.views = round(b.views);
        b.recency = round(b.recency);
        b.duration_match = round(b.duration_match);
        for value in b.extra.values_mut() {
            *value = round(*value);
        }
        self
    }
}

impl From<&ScoredVideo> for VideoRecommendation {
    fn from(s: &ScoredVideo) -> Self {
        let v = &s.video;
        Self {
            video_id: v.video_id.clone(),
            title: v.title.clone(),
            channel: v.channel.clone(),
            thumbnail: v.thumbnail.clone(),
            duration: format_duration(v.duration_seconds),
            duration_seconds: v.duration_seconds,
            view_count: v.view_count,
            like_count: v.like_count,
            published_at: v.published_at,
            score: s.score,
            score_breakdown: s.breakdown.clone(),
        }
    }
}

impl From<ScoredVideo> for VideoRecommendation {
    fn from(s: ScoredVideo) -> Self {
        Self::from(&s)
    }
}
