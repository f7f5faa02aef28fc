use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{health, levels, narrative};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .merge(health::router())
        .merge(levels::router())
        .merge(narrative::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Development service: any origin, method and header
        .layer(CorsLayer::permissive())
}
