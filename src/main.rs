use std::sync::Arc;

use tokio::net::TcpListener;
use tradequest_backend::app;
use tradequest_backend::config::AppConfig;
use tradequest_backend::logging::init_logging;
use tradequest_backend::services::level_store::LevelStore;
use tradequest_backend::services::narrative_service::build_narrator;
use tradequest_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_logging(&config.logging)?;

    tracing::info!(
        "📚 Serving levels from {} (narrator: {}, key loaded: {})",
        config.data_dir.display(),
        config.narrator.mode.as_str(),
        config.narrator.key_loaded()
    );

    let state = AppState {
        level_store: Arc::new(LevelStore::new(&config.data_dir)),
        narrator: build_narrator(&config.narrator)?,
        key_loaded: config.narrator.key_loaded(),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🚀 TradeQuest backend running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
