use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::info;
use tutorank_engine::ScoringConfig;

use crate::models::HealthResponse;
use crate::state::{AppState, SERVICE_NAME};

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}

// effective weights and constants, read-only
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ScoringConfig> {
    info!("Config request");
    Json(state.recommender.config().clone())
}
