//! Video duration helpers: ISO-8601 parsing, display formatting, bucketing

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Upper bound (exclusive) of a short video, 10 minutes
pub const SHORT_MAX_SECONDS: i64 = 10 * 60;

/// Upper bound (inclusive) of a medium video, 30 minutes
pub const MEDIUM_MAX_SECONDS: i64 = 30 * 60;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("valid duration pattern")
});

/// Length category of a video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationBucket {
    Short,  // < 10 min
    Medium, // 10 - 30 min
    Long,   // > 30 min
}

impl DurationBucket {
    /// Negative durations are treated as zero (short)
    pub fn from_seconds(seconds: i64) -> Self {
        let seconds = seconds.max(0);
        if seconds < SHORT_MAX_SECONDS {
            Self::Short
        } else if seconds <= MEDIUM_MAX_SECONDS {
            Self::Medium
        } else {
            Self::Long
        }
    }

    /// Distance between buckets on the short < medium < long scale (0, 1 or 2)
    pub fn distance(&self, other: &Self) -> u8 {
        (self.ordinal() as i8 - other.ordinal() as i8).unsigned_abs()
    }

    fn ordinal(&self) -> u8 {
        match self {
            Self::Short => 0,
            Self::Medium => 1,
            Self::Long => 2,
        }
    }
}

/// Parse an ISO-8601 duration like "PT1H30M45S" into seconds.
/// Anything that does not look like a duration, or does not fit in an i64, yields 0.
pub fn parse_iso8601_duration(duration: &str) -> i64 {
    let Some(caps) = ISO_DURATION.captures(duration.trim()) else {
        return 0;
    };

    // a component too large to parse is treated like an unparseable value
    let part = |i: usize| -> Option<i64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse::<i64>().ok(),
            None => Some(0),
        }
    };

    match (part(1), part(2), part(3)) {
        (Some(h), Some(m), Some(sec)) => checked_seconds(h, m, sec).unwrap_or(0),
        _ => 0,
    }
}

fn checked_seconds(hours: i64, minutes: i64, seconds: i64) -> Option<i64> {
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// Format seconds as "H:MM:SS" (with hours) or "M:SS"
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
