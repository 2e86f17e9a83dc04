mod handlers;
mod models;
mod state;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tutorank_engine::{Recommender, ScoringConfig, config::DEFAULT_CONFIG_PATH};

use crate::handlers::{get_config, health_check, search_videos};
use crate::state::AppState;

const DEFAULT_ADDR: &str = "0.0.0.0:8000";

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/search", post(search_videos))
        .route("/api/config", get(get_config))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    //logging setup
    tracing_subscriber::fmt::init();

    // scoring config is loaded once and stays read-only
    let config_path =
        std::env::var("TUTORANK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    info!(path = %config_path, "Loading scoring config...");
    let config = ScoringConfig::load_or_default(&config_path)?;
    info!(
        relevance = config.weights.relevance,
        like_ratio = config.weights.like_ratio,
        views = config.weights.views,
        recency = config.weights.recency,
        duration_match = config.weights.duration_match,
        top_k = config.results.top_k,
        "Scoring weights ready"
    );

    let recommender = Recommender::new(config)?;
    let state = Arc::new(AppState::new(recommender));

    // Server start
    let addr = std::env::var("TUTORANK_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
