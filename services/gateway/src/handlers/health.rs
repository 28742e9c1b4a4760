use crate::models::HealthResponse;
use crate::state::AppState;
use axum::{Json, extract::State};

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        connections: state.registry.len(),
    })
}
