// Score contributors - optional extra factors on top of the five built-in ones

use tutorank_core::{CandidateVideo, ContributorNote};

/// What a contributor says about one candidate: a score in [0,1] plus
/// optional flags (e.g. "clickbait") and a human readable reason.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributorScore {
    pub score: f64,
    pub flags: Vec<String>,
    pub reason: Option<String>,
}

impl ContributorScore {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            flags: Vec::new(),
            reason: None,
        }
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Breakdown note, `None` when there is nothing to explain
    pub fn note(&self) -> Option<ContributorNote> {
        let note = ContributorNote {
            flags: self.flags.clone(),
            reason: self.reason.clone(),
        };
        (!note.is_empty()).then_some(note)
    }
}

// Contributor trait - anything that can rate a candidate in [0,1]
pub trait ScoreContributor: Send + Sync {
    /// Key under which the score shows up in the breakdown
    fn name(&self) -> &'static str;

    fn is_enabled(&self) -> bool {
        true
    }

    fn score(&self, video: &CandidateVideo) -> ContributorScore;
}

/// Comment-based quality analyzer.
///
/// Comment fetching and content analysis are not done here, so every candidate
/// gets the neutral score 1.0 and rankings are unaffected.
#[derive(Debug, Clone, Default)]
pub struct CommentAnalyzer {
    enabled: bool,
}

impl CommentAnalyzer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl ScoreContributor for CommentAnalyzer {
    fn name(&self) -> &'static str {
        "comment_quality"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn score(&self, _video: &CandidateVideo) -> ContributorScore {
        ContributorScore::new(1.0).with_reason("comment analysis not implemented, neutral score")
    }
}
