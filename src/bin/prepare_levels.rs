//! Offline level preparation: downloads the historical windows behind each
//! level and writes them as `{data_dir}/{level}.json`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tradequest_backend::config::data_dir_from_env;
use tradequest_backend::external::yahoo::YahooChartProvider;
use tradequest_backend::logging::{init_logging, LoggingConfig};
use tradequest_backend::services::level_store::LevelStore;
use tradequest_backend::services::scenario_service::{default_scenarios, prepare_all};

#[derive(Debug, Parser)]
#[command(name = "prepare_levels", about = "Download market history and write TradeQuest level files")]
struct Cli {
    /// Output directory (defaults to DATA_DIR or ./data)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Prepare a single level by name, e.g. level_2
    #[arg(long)]
    only: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging(&LoggingConfig::from_env("tradequest-prepare"))?;

    let cli = Cli::parse();
    let store = LevelStore::new(cli.data_dir.unwrap_or_else(data_dir_from_env));

    let mut scenarios = default_scenarios();
    if let Some(only) = &cli.only {
        scenarios.retain(|s| &s.name == only);
        anyhow::ensure!(!scenarios.is_empty(), "unknown level '{}'", only);
    }

    let provider = YahooChartProvider::new();
    let prepared = prepare_all(&provider, &store, &scenarios)
        .await
        .context("Something went wrong while preparing levels")?;

    for (name, days) in prepared {
        println!("{name}: {days} turns");
    }
    println!("All scenarios ready in {}. You can now run the server.", store.data_dir().display());

    Ok(())
}
