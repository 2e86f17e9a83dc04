use axum::{Json, http::StatusCode};
use serde::Serialize;
use tutorank_core::VideoRecommendation;
use tutorank_engine::EngineError;

/// JSON error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: u16,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (status, Json(Self {
            error: message.into(),
            code: status.as_u16(),
        }))
    }

    pub fn bad_request(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn from_engine(err: EngineError) -> (StatusCode, Json<Self>) {
        match err {
            EngineError::InvalidRequest(_) => Self::bad_request(err.to_string()),
            EngineError::InvalidConfiguration(_) => Self::internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub recommendations: Vec<VideoRecommendation>,
}
