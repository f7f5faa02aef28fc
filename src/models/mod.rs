mod daily_record;
mod level;
mod narrative;

pub use daily_record::{round2, DailyRecord};
pub use level::{Level, LevelCatalog, LevelResponse};
pub use narrative::{NarrativeResult, NarrativeSource, Vibe};
