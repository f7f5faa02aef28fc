use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::info;

use crate::errors::MarketDataError;
use crate::external::market_data::{Column, MarketDataProvider, PriceFrame, CLOSE_COLUMN, VOLUME_COLUMN};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart API. No API key required.
pub struct YahooChartProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new() -> Self {
        Self::with_base_url(CHART_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (compatible; TradeQuest/0.1)")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.into(),
        }
    }
}

impl Default for YahooChartProvider {
    fn default() -> Self {
        Self::new()
    }
}

// Minimal response structs (only what we need)
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
    #[serde(default)]
    adjclose: Vec<YahooAdjClose>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[async_trait]
impl MarketDataProvider for YahooChartProvider {
    async fn fetch_daily_frame(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceFrame, MarketDataError> {
        let period1 = to_unix(start)?;
        let period2 = to_unix(end)?;

        let resp = self
            .client
            .get(format!("{}/{}", self.base_url, ticker))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited);
        }

        let body = resp
            .json::<YahooChartResponse>()
            .await
            .map_err(|e| MarketDataError::Parse(e.to_string()))?;

        let frame = parse_chart(ticker, body)?;
        info!("Fetched {} daily rows for {} from Yahoo Finance", frame.len(), ticker);
        Ok(frame)
    }
}

fn to_unix(date: NaiveDate) -> Result<i64, MarketDataError> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| MarketDataError::Parse(format!("bad date {}", date)))
}

/// Columns come back tagged with the ticker, like a multi-ticker download
fn parse_chart(ticker: &str, body: YahooChartResponse) -> Result<PriceFrame, MarketDataError> {
    if let Some(err) = body.chart.error {
        return Err(MarketDataError::BadResponse(err.description));
    }

    let result = body
        .chart
        .result
        .and_then(|mut r| r.pop())
        .ok_or_else(|| MarketDataError::BadResponse("missing result".into()))?;

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| MarketDataError::BadResponse("missing quote".into()))?;

    // Auto-adjust: the adjusted close stands in as Close when Yahoo provides it
    let closes = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .filter(|a| !a.is_empty())
        .unwrap_or(quote.close);

    let mut dates = Vec::with_capacity(result.timestamp.len());
    for ts in &result.timestamp {
        let dt = DateTime::from_timestamp(*ts, 0)
            .ok_or_else(|| MarketDataError::Parse(format!("bad timestamp {}", ts)))?;
        dates.push(dt.date_naive());
    }

    let n = dates.len();
    let pad = |mut v: Vec<Option<f64>>| {
        v.resize(n, None);
        v
    };

    Ok(PriceFrame::new(dates)
        .with_column(Column::new(&[CLOSE_COLUMN, ticker], pad(closes)))
        .with_column(Column::new(&[VOLUME_COLUMN, ticker], pad(quote.volume))))
}
