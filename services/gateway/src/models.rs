use serde::{Deserialize, Serialize};

/// Form body of `POST /v1/match`
///
/// Accepted as urlencoded or multipart. Both fields default to empty so a
/// missing field reaches validation instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchForm {
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub uuid: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub connections: usize,
}
