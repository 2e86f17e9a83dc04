use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use tutorank_core::VideoRecommendation;

use crate::models::{ApiError, SearchBody, SearchResponse};
use crate::state::AppState;

// decimals kept in the response
const SCORE_PRECISION: i32 = 4;

pub async fn search_videos(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ApiError>)> {
    let start = Instant::now();

    // malformed bodies get the same JSON error shape as engine errors
    let Json(body) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Search body rejected");
        ApiError::new(rejection.status(), rejection.body_text())
    })?;

    let (candidates, skipped) = body.parse_candidates();
    for s in &skipped {
        warn!(
            index = s.index,
            video_id = ?s.video_id,
            error = %s.error,
            "Skipping malformed candidate"
        );
    }

    info!(
        technology = %body.request.technology,
        level = ?body.request.level,
        duration = ?body.request.duration_preference,
        max_months = ?body.request.max_months,
        candidates = candidates.len(),
        skipped = skipped.len(),
        "Search request"
    );

    let result = state
        .recommender
        .recommend(&body.request, &candidates, body.top_k)
        .map_err(|e| {
            warn!(error = %e, "Search rejected");
            ApiError::from_engine(e)
        })?;

    let recommendations: Vec<VideoRecommendation> = result
        .recommendations
        .iter()
        .map(|scored| VideoRecommendation::from(scored).rounded(SCORE_PRECISION))
        .collect();

    info!(
        query = %result.query,
        results = recommendations.len(),
        time_ms = start.elapsed().as_millis(),
        "Search complete"
    );

    Ok(Json(SearchResponse {
        query: result.query,
        recommendations,
    }))
}
