//! Mapping of already-fetched YouTube Data API `videos.list` items into candidates.
//! No network access happens here, the fetch layer hands us the JSON.

use crate::{parse_iso8601_duration, CandidateVideo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Rank given to a detail item that is missing from the search result list
pub const UNRANKED_SEARCH_RANK: u32 = 999;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("video {video_id}: unparseable publishedAt {value:?}")]
    InvalidPublishedAt { video_id: String, value: String },
}

// API counts come as strings ("12345") but hand-written dumps often use numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Number(i64),
    Text(String),
}

impl Count {
    fn value(&self) -> i64 {
        match self {
            Count::Number(n) => *n,
            Count::Text(s) => s.trim().parse().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub view_count: Option<Count>,
    #[serde(default)]
    pub like_count: Option<Count>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentDetails {
    #[serde(default)]
    pub duration: Option<String>,
}

/// One item of a `videos.list` response (part=snippet,statistics,contentDetails)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub statistics: Statistics,
    #[serde(default)]
    pub content_details: ContentDetails,
}

impl CandidateVideo {
    /// Build a candidate from a detail item, filling defaults for anything missing
    pub fn from_video_item(item: &VideoItem, search_rank: u32) -> Result<Self, MappingError> {
        let published_at = DateTime::parse_from_rfc3339(item.snippet.published_at.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| MappingError::InvalidPublishedAt {
                video_id: item.id.clone(),
                value: item.snippet.published_at.clone(),
            })?;

        let duration = item.content_details.duration.as_deref().unwrap_or("PT0S");
        let count = |c: &Option<Count>| c.as_ref().map(Count::value).unwrap_or(0);

        Ok(Self {
            video_id: item.id.clone(),
            title: item.snippet.title.clone(),
            channel: item.snippet.channel_title.clone(),
            thumbnail: item
                .snippet
                .thumbnails
                .get("high")
                .map(|t| t.url.clone())
                .unwrap_or_default(),
            duration_seconds: parse_iso8601_duration(duration),
            view_count: count(&item.statistics.view_count),
            like_count: count(&item.statistics.like_count),
            published_at,
            search_rank,
        })
    }
}

/// Pair every detail item with its 1-based position in the search results.
/// Items the search did not return get `UNRANKED_SEARCH_RANK`. Output is in rank order.
pub fn rank_by_search_order(search_ids: &[String], items: Vec<VideoItem>) -> Vec<(u32, VideoItem)> {
    let rank_map: HashMap<&str, u32> = search_ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx as u32 + 1))
        .collect();

    let mut ranked: Vec<(u32, VideoItem)> = items
        .into_iter()
        .map(|item| {
            let rank = rank_map
                .get(item.id.as_str())
                .copied()
                .unwrap_or(UNRANKED_SEARCH_RANK);
            (rank, item)
        })
        .collect();

    // stable, so unranked items keep their detail order
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked
}

/// Map items given in search order. Bad records are reported and skipped so one
/// broken item does not lose the whole batch.
pub fn candidates_from_items(items: &[VideoItem]) -> (Vec<CandidateVideo>, Vec<MappingError>) {
    let mut candidates = Vec::with_capacity(items.len());
    let mut errors = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        match CandidateVideo::from_video_item(item, idx as u32 + 1) {
            Ok(c) => candidates.push(c),
            Err(e) => errors.push(e),
        }
    }

    (candidates, errors)
}
