use tutorank_engine::Recommender;

pub const SERVICE_NAME: &str = "tutorank";

pub struct AppState {
    pub recommender: Recommender,
}

impl AppState {
    pub fn new(recommender: Recommender) -> Self {
        Self { recommender }
    }
}
