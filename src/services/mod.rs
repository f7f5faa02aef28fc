pub mod level_store;
pub mod narrative_service;
pub mod scenario_service;
