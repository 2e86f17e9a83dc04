// Query Builder - turns a structured request into a search string + post-filter params

use crate::error::EngineError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tutorank_core::{DurationPreference, SearchRequest, SkillLevel};

pub const MAX_TECHNOLOGY_LEN: usize = 100;
pub const MAX_RECENCY_MONTHS: u32 = 60;

/// A recency month is a fixed 30-day block, not a calendar month
pub const DAYS_PER_MONTH: i64 = 30;

/// Filters the scorer applies locally after the upstream search
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringFilters {
    pub duration_preference: DurationPreference,
    pub max_months: Option<u32>,
}

impl ScoringFilters {
    /// Oldest publication time still accepted, `None` when there is no cutoff
    pub fn published_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = self.max_months?;
        let window = TimeDelta::try_days(i64::from(months) * DAYS_PER_MONTH)?;
        // out of chrono's range means everything is recent enough
        now.checked_sub_signed(window)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub search_query: String,
    pub filters: ScoringFilters,
}

impl BuiltQuery {
    pub fn published_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.filters.published_after(now)
    }
}

/// Keyword suffix appended for each level
fn level_suffix(level: Option<SkillLevel>) -> &'static str {
    match level {
        Some(SkillLevel::Beginner) => "tutorial for beginners",
        Some(SkillLevel::Intermediate) => "intermediate tutorial",
        Some(SkillLevel::Advanced) => "advanced tutorial",
        None => "tutorial",
    }
}

/// Build the upstream search string, e.g. "React tutorial for beginners"
pub fn build_query(technology: &str, level: Option<SkillLevel>) -> Result<String, EngineError> {
    let technology = technology.trim();
    if technology.is_empty() {
        return Err(EngineError::request("technology must not be empty"));
    }

    Ok(format!("{} {}", technology, level_suffix(level)))
}

pub struct QueryBuilder;

impl QueryBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Validate the request and split it into search string and local filters
    pub fn build(&self, request: &SearchRequest) -> Result<BuiltQuery, EngineError> {
        // limit applies to the raw input, surrounding whitespace included
        if request.technology.chars().count() > MAX_TECHNOLOGY_LEN {
            return Err(EngineError::request(format!(
                "technology must be at most {} characters",
                MAX_TECHNOLOGY_LEN
            )));
        }

        if let Some(months) = request.max_months {
            if months == 0 || months > MAX_RECENCY_MONTHS {
                return Err(EngineError::request(format!(
                    "max_months must be between 1 and {}, got {}",
                    MAX_RECENCY_MONTHS, months
                )));
            }
        }

        let search_query = build_query(&request.technology, request.level)?;
        debug!(query = %search_query, "Search query built");

        Ok(BuiltQuery {
            search_query,
            filters: ScoringFilters {
                duration_preference: request.duration_preference,
                max_months: request.max_months,
            },
        })
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
