use serde::Deserialize;
use serde_json::Value;
use tutorank_core::{CandidateVideo, SearchRequest};

// Body of POST /api/search
// candidates come from the fetch layer, already in search order
#[derive(Deserialize)]
pub struct SearchBody {
    #[serde(flatten)]
    pub request: SearchRequest,

    #[serde(default)]
    pub top_k: Option<usize>,

    // kept raw so one malformed record does not reject the whole request
    #[serde(default)]
    pub candidates: Vec<Value>,
}

/// A candidate the handler could not decode
#[derive(Debug)]
pub struct SkippedCandidate {
    pub index: usize,
    pub video_id: Option<String>,
    pub error: String,
}

impl SearchBody {
    /// Decode every candidate on its own, keeping input order for the good ones
    pub fn parse_candidates(&self) -> (Vec<CandidateVideo>, Vec<SkippedCandidate>) {
        let mut candidates = Vec::with_capacity(self.candidates.len());
        let mut skipped = Vec::new();

        for (index, raw) in self.candidates.iter().enumerate() {
            match CandidateVideo::deserialize(raw) {
                Ok(candidate) => candidates.push(candidate),
                Err(e) => skipped.push(SkippedCandidate {
                    index,
                    video_id: raw
                        .get("video_id")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    error: e.to_string(),
                }),
            }
        }

        (candidates, skipped)
    }
}
