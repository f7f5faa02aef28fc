use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::NarrativeResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze_turn", post(analyze_turn))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeTurnParams {
    pub change: f64,
}

/// POST /analyze_turn?change=<percent>
pub async fn analyze_turn(
    State(state): State<AppState>,
    params: Result<Query<AnalyzeTurnParams>, QueryRejection>,
) -> Result<Json<NarrativeResult>, AppError> {
    let Query(params) = params.map_err(|rejection| {
        warn!("POST /analyze_turn - rejected query: {}", rejection.body_text());
        AppError::Validation(rejection.body_text())
    })?;

    info!("POST /analyze_turn - change: {}", params.change);
    Ok(Json(state.narrator.narrate(params.change).await))
}
