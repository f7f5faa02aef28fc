use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::{AppError, LevelStoreError};
use crate::models::{LevelCatalog, LevelResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/levels", get(list_levels))
        .route("/load_level/:level_id", get(load_level))
}

/// GET /load_level/:level_id
pub async fn load_level(
    Path(level_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LevelResponse>, AppError> {
    info!("GET /load_level/{} - Loading level", level_id);

    let level = state.level_store.load_level(&level_id).await.map_err(|e| {
        match &e {
            LevelStoreError::NotFound(_) => info!("Level {} not found", level_id),
            _ => error!("Failed to load level {}: {}", level_id, e),
        }
        AppError::from(e)
    })?;

    Ok(Json(LevelResponse::from(level)))
}

/// GET /levels
pub async fn list_levels(State(state): State<AppState>) -> Result<Json<LevelCatalog>, AppError> {
    info!("GET /levels - Listing levels");

    let levels = state.level_store.list_levels().await.map_err(|e| {
        error!("Failed to list levels: {}", e);
        AppError::from(e)
    })?;

    Ok(Json(LevelCatalog { levels }))
}
