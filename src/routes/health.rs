use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub key_loaded: bool,
    pub mode: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    info!("GET / - Health check");
    Json(HealthResponse {
        status: "TradeQuest Backend Online",
        key_loaded: state.key_loaded,
        mode: state.narrator.mode().as_str(),
    })
}
