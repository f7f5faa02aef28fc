use serde::Serialize;

use super::DailyRecord;

/// A named, ordered run of trading days presented as one game scenario
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub level_id: String,
    pub records: Vec<DailyRecord>,
}

impl Level {
    pub fn day_count(&self) -> usize {
        self.records.len()
    }
}

/// Payload of GET /load_level/:level_id
#[derive(Debug, Clone, Serialize)]
pub struct LevelResponse {
    pub level: String,
    pub total_days: usize,
    pub market_data: Vec<DailyRecord>,
}

impl From<Level> for LevelResponse {
    fn from(level: Level) -> Self {
        Self {
            total_days: level.day_count(),
            level: level.level_id,
            market_data: level.records,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelCatalog {
    pub levels: Vec<String>,
}
