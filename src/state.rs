use std::sync::Arc;

use crate::services::level_store::LevelStore;
use crate::services::narrative_service::Narrator;

#[derive(Clone)]
pub struct AppState {
    pub level_store: Arc<LevelStore>,
    pub narrator: Arc<dyn Narrator>,
    pub key_loaded: bool,
}
