use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Level not found")]
    NotFound,
    #[error("Corrupt level data: {0}")]
    CorruptData(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, detail) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Level not found".to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::CorruptData(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<LevelStoreError> for AppError {
    fn from(value: LevelStoreError) -> Self {
        match value {
            LevelStoreError::NotFound(_) => AppError::NotFound,
            e @ LevelStoreError::Corrupt { .. } => AppError::CorruptData(e.to_string()),
            e @ LevelStoreError::Io { .. } => AppError::Internal(e.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum LevelStoreError {
    #[error("level '{0}' not found")]
    NotFound(String),
    #[error("level '{level_id}' is not valid JSON: {source}")]
    Corrupt {
        level_id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("I/O error on level '{level_id}': {source}")]
    Io {
        level_id: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of a single text-generation backend
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("request timed out")]
    Timeout,
    #[error("rate limited")]
    RateLimited,
    #[error("API error: {0}")]
    ApiError(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("backend returned an empty completion")]
    EmptyCompletion,
}

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("network error: {0}")]
    Network(String),
    #[error("bad response: {0}")]
    BadResponse(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("rate limited")]
    RateLimited,
}

#[derive(Debug, Error)]
pub enum PrepError {
    #[error("market data for {ticker}: {source}")]
    MarketData {
        ticker: String,
        #[source]
        source: MarketDataError,
    },
    #[error("no close price column in data for {0}")]
    MissingCloseColumn(String),
    #[error(transparent)]
    Store(#[from] LevelStoreError),
}
