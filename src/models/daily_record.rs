use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day inside a level. Every stored record carries a defined
/// percent change; the first day of a raw series never makes it to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,   // serialized as YYYY-MM-DD
    pub price: f64,        // close, 2 decimals
    pub change: f64,       // percent vs previous day, 2 decimals
    #[serde(default)]
    pub volume: u64,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, price: f64, change: f64, volume: u64) -> Self {
        Self {
            date,
            price: round2(price),
            change: round2(change),
            volume,
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
