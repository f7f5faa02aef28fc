use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;

pub const CLOSE_COLUMN: &str = "Close";
pub const VOLUME_COLUMN: &str = "Volume";

/// A named column. Providers may hand back multi-level names such as
/// `["Close", "SPY"]`; [`PriceFrame::flatten_columns`] reduces them to the
/// first level.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: Vec<String>,
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(name: &[&str], values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.iter().map(|s| s.to_string()).collect(),
            values,
        }
    }

    pub fn label(&self) -> String {
        self.name.join(" ")
    }
}

/// Daily rows of a single ticker, one value per column per date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceFrame {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<Column>,
}

impl PriceFrame {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self { dates, columns: Vec::new() }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn is_multi_level(&self) -> bool {
        self.columns.iter().any(|c| c.name.len() > 1)
    }

    pub fn flatten_columns(&mut self) {
        for column in &mut self.columns {
            column.name.truncate(1);
        }
    }

    pub fn column(&self, label: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.label() == label)
    }

    /// `Close` by exact name, otherwise the first column whose name mentions it
    pub fn close_column(&self) -> Option<&Column> {
        self.column(CLOSE_COLUMN).or_else(|| {
            self.columns
                .iter()
                .find(|c| c.label().contains(CLOSE_COLUMN))
        })
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars for `ticker` in `[start, end)`, ascending by date
    async fn fetch_daily_frame(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceFrame, MarketDataError>;
}
