pub mod market_data;
pub mod text_backend;
pub mod yahoo;
