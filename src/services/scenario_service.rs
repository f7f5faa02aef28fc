use chrono::NaiveDate;
use tracing::{error, info};

use crate::errors::PrepError;
use crate::external::market_data::{MarketDataProvider, PriceFrame, VOLUME_COLUMN};
use crate::models::DailyRecord;
use crate::services::level_store::LevelStore;

/// A historical window shipped as one level
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Scenario {
    pub fn new(name: &str, ticker: &str, start: (i32, u32, u32), end: (i32, u32, u32)) -> Option<Self> {
        Some(Self {
            name: name.to_string(),
            ticker: ticker.to_string(),
            start: NaiveDate::from_ymd_opt(start.0, start.1, start.2)?,
            end: NaiveDate::from_ymd_opt(end.0, end.1, end.2)?,
        })
    }
}

pub fn default_scenarios() -> Vec<Scenario> {
    [
        // The Covid crash: sharp drop, quick recovery
        Scenario::new("level_1", "SPY", (2020, 2, 15), (2020, 5, 1)),
        // Crypto winter: long slow bleed
        Scenario::new("level_2", "BTC-USD", (2021, 11, 1), (2022, 2, 1)),
        // Dot-com bubble: high volatility
        Scenario::new("level_3", "QQQ", (2000, 3, 1), (2000, 6, 1)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Normalize a provider frame and turn it into daily records.
///
/// Percent change is measured against the last known close, so a gap in the
/// close series does not drop the day after it. The first row never has a
/// change and is dropped, as is any row missing a value. Volume is 0 only when
/// the frame has no volume column at all.
pub fn build_daily_records(ticker: &str, mut frame: PriceFrame) -> Result<Vec<DailyRecord>, PrepError> {
    if frame.is_multi_level() {
        frame.flatten_columns();
    }

    let closes = frame
        .close_column()
        .ok_or_else(|| PrepError::MissingCloseColumn(ticker.to_string()))?
        .values
        .clone();
    let volumes = frame.column(VOLUME_COLUMN).map(|c| c.values.clone());

    let mut records = Vec::with_capacity(frame.len().saturating_sub(1));
    let mut last_close: Option<f64> = None;

    for (i, date) in frame.dates.iter().enumerate() {
        let Some(price) = closes.get(i).copied().flatten() else {
            continue;
        };
        let previous = last_close.replace(price);

        let Some(prev) = previous.filter(|p| *p != 0.0) else {
            continue;
        };
        let change = (price - prev) / prev * 100.0;

        let volume = match &volumes {
            None => 0,
            Some(values) => match values.get(i).copied().flatten() {
                Some(v) if v.is_finite() && v >= 0.0 => v as u64,
                _ => continue,
            },
        };

        records.push(DailyRecord::new(*date, price, change, volume));
    }

    Ok(records)
}

pub async fn prepare_scenario(
    provider: &dyn MarketDataProvider,
    store: &LevelStore,
    scenario: &Scenario,
) -> Result<usize, PrepError> {
    info!("📉 Downloading {} ({})...", scenario.name, scenario.ticker);

    let frame = provider
        .fetch_daily_frame(&scenario.ticker, scenario.start, scenario.end)
        .await
        .map_err(|source| PrepError::MarketData {
            ticker: scenario.ticker.clone(),
            source,
        })?;

    let records = build_daily_records(&scenario.ticker, frame)?;
    store.save_level(&scenario.name, &records).await?;

    info!("✅ Saved {} turns for {}", records.len(), scenario.name);
    Ok(records.len())
}

/// Runs scenarios one after another; the first failure aborts the batch
pub async fn prepare_all(
    provider: &dyn MarketDataProvider,
    store: &LevelStore,
    scenarios: &[Scenario],
) -> Result<Vec<(String, usize)>, PrepError> {
    let mut prepared = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        match prepare_scenario(provider, store, scenario).await {
            Ok(count) => prepared.push((scenario.name.clone(), count)),
            Err(e) => {
                error!("❌ Preparing {} failed: {}", scenario.name, e);
                return Err(e);
            }
        }
    }
    info!("🎉 All {} scenarios ready", prepared.len());
    Ok(prepared)
}
