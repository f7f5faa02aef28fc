use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::logging::LoggingConfig;

pub const SERVICE_NAME: &str = "tradequest";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL_ROSTER: &[&str] = &["gpt-4o-mini", "gpt-4o", "gpt-3.5-turbo"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Which narration strategy the server runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarratorMode {
    RuleBased,
    Generative,
}

impl NarratorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NarratorMode::RuleBased => "rules",
            NarratorMode::Generative => "generative",
        }
    }
}

impl FromStr for NarratorMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rules" | "rule_based" | "deterministic" => Ok(NarratorMode::RuleBased),
            "generative" | "llm" => Ok(NarratorMode::Generative),
            _ => Err(()),
        }
    }
}

/// Configuration for the narrative engine
#[derive(Debug, Clone)]
pub struct NarratorConfig {
    pub mode: NarratorMode,
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: Vec<String>,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            mode: NarratorMode::Generative,
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            models: DEFAULT_MODEL_ROSTER.iter().map(|m| m.to_string()).collect(),
            max_tokens: 120,
            temperature: 0.9,
            timeout_secs: 30,
        }
    }
}

impl NarratorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mode = match std::env::var("NARRATOR_MODE") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "NARRATOR_MODE",
                value,
            })?,
            Err(_) => defaults.mode,
        };

        let api_key = std::env::var("LLM_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let models = match std::env::var("LLM_MODELS") {
            Ok(raw) => parse_roster(&raw),
            Err(_) => defaults.models,
        };

        Ok(Self {
            mode,
            api_key,
            base_url: std::env::var("LLM_BASE_URL").unwrap_or(defaults.base_url),
            models,
            max_tokens: parse_var("LLM_MAX_TOKENS", defaults.max_tokens)?,
            temperature: parse_var("LLM_TEMPERATURE", defaults.temperature)?,
            timeout_secs: parse_var("LLM_TIMEOUT_SECS", defaults.timeout_secs)?,
        })
    }

    pub fn key_loaded(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Process-wide configuration, built once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub narrator: NarratorConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_raw = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            var: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        Ok(Self {
            bind_addr,
            data_dir: data_dir_from_env(),
            narrator: NarratorConfig::from_env()?,
            logging: LoggingConfig::from_env(SERVICE_NAME),
        })
    }
}

pub fn data_dir_from_env() -> PathBuf {
    std::env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Split a comma separated model list, keeping order and dropping blanks
pub fn parse_roster(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}
