use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("LOKI_ENABLED is true but LOKI_URL is not set")]
    MissingLokiUrl,
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("invalid LOKI_URL: {0}")]
    LokiUrl(#[from] url::ParseError),
    #[error("loki layer: {0}")]
    Loki(String),
    #[error("global subscriber already set: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Log shipping settings. The service name is owned by the binary that logs.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
    pub loki_url: Option<String>,
    pub loki_enabled: bool,
}

impl LoggingConfig {
    /// `SERVICE_NAME` overrides `default_service`
    pub fn from_env(default_service: &str) -> Self {
        Self {
            service_name: std::env::var("SERVICE_NAME").unwrap_or_else(|_| default_service.to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            loki_url: std::env::var("LOKI_URL").ok().filter(|u| !u.trim().is_empty()),
            loki_enabled: std::env::var("LOKI_ENABLED")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    pub fn validate(&self) -> Result<(), LoggingError> {
        if self.loki_enabled && self.loki_url.is_none() {
            return Err(LoggingError::MissingLokiUrl);
        }
        Ok(())
    }
}

/// Installs the global subscriber: env filter, console output, and Loki
/// when enabled. Must run inside the tokio runtime.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.log_level)?;
    let loki = loki_layer(config)?;
    let shipping = loki.is_some();

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(loki)
        .try_init()?;

    tracing::info!(
        "📜 Logging for {} ({}) at {}{}",
        config.service_name,
        config.environment,
        config.log_level,
        if shipping { ", shipping to Loki" } else { "" }
    );
    if config.loki_enabled && !shipping {
        tracing::warn!("LOKI_ENABLED is set but this build has no `loki` feature");
    }
    Ok(())
}

#[cfg(feature = "loki")]
fn loki_layer(config: &LoggingConfig) -> Result<Option<tracing_loki::Layer>, LoggingError> {
    let Some(loki_url) = config.loki_url.as_deref().filter(|_| config.loki_enabled) else {
        return Ok(None);
    };

    let url = url::Url::parse(loki_url)?;
    let (layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)
        .and_then(|b| b.label("environment", &config.environment))
        .and_then(|b| b.build_url(url))
        .map_err(|e| LoggingError::Loki(e.to_string()))?;

    tokio::spawn(task);
    Ok(Some(layer))
}

#[cfg(not(feature = "loki"))]
fn loki_layer(_config: &LoggingConfig) -> Result<Option<tracing_subscriber::layer::Identity>, LoggingError> {
    Ok(None)
}
