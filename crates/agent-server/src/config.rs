//! Settings
//!
//! Resolved once at start-up and never mutated afterwards. Missing API keys
//! are not an error here; requests that need them fail instead.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use agent_runtime::{GroqConfig, InvalidSetting, InvocationError, TavilyConfig};
use thiserror::Error;

/// Models a client may ask for unless `ALLOWED_MODELS` says otherwise
pub const DEFAULT_ALLOWED_MODELS: [&str; 2] = ["llama3-70b-8192", "llama-3.3-70b-versatile"];

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:9999";
const DEFAULT_UI_ADDR: &str = "127.0.0.1:8501";
const DEFAULT_READY_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {key}={value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Configuration error: ALLOWED_MODELS must name at least one model")]
    EmptyAllowList,
}

impl From<InvalidSetting> for ConfigError {
    fn from(e: InvalidSetting) -> Self {
        Self::Invalid {
            key: e.key,
            value: e.value,
            reason: e.reason,
        }
    }
}

/// Process-wide settings
#[derive(Clone, Debug)]
pub struct Settings {
    /// Chat provider credentials and endpoint
    pub groq: GroqConfig,

    /// Search provider credentials and endpoint
    pub tavily: TavilyConfig,

    /// The only values accepted for `model_name`, in display order
    pub allowed_models: Vec<String>,

    /// Where the chat API listens
    pub bind_addr: SocketAddr,

    /// Where the UI is served
    pub ui_addr: SocketAddr,

    /// Compiled web bundle
    pub static_dir: PathBuf,

    /// How long the supervisor waits for a service to come up
    pub ready_timeout: Duration,
}

impl Settings {
    /// Read settings from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let allowed_models = match lookup("ALLOWED_MODELS") {
            Some(raw) => parse_model_list(&raw)?,
            None => DEFAULT_ALLOWED_MODELS.iter().map(|m| (*m).to_string()).collect(),
        };

        let ready_timeout_secs = match lookup("READY_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: "READY_TIMEOUT_SECS",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_READY_TIMEOUT_SECS,
        };

        Ok(Self {
            groq: GroqConfig::from_lookup(&lookup)?,
            tavily: TavilyConfig::from_lookup(&lookup),
            allowed_models,
            bind_addr: parse_addr("BIND_ADDR", lookup("BIND_ADDR"), DEFAULT_BIND_ADDR)?,
            ui_addr: parse_addr("UI_ADDR", lookup("UI_ADDR"), DEFAULT_UI_ADDR)?,
            static_dir: lookup("STATIC_DIR").map_or_else(|| PathBuf::from("static"), PathBuf::from),
            ready_timeout: Duration::from_secs(ready_timeout_secs),
        })
    }

    pub fn is_model_allowed(&self, model: &str) -> bool {
        self.allowed_models.iter().any(|m| m == model)
    }

    /// Reject a model that is not on the allow-list
    pub fn check_model(&self, model: &str) -> Result<(), InvocationError> {
        if self.is_model_allowed(model) {
            Ok(())
        } else {
            Err(InvocationError::InvalidModel(model.to_string()))
        }
    }

}

/// Comma-separated, trimmed, de-duplicated, order kept
fn parse_model_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut models: Vec<String> = Vec::new();
    for model in raw.split(',').map(str::trim).filter(|m| !m.is_empty()) {
        if !models.iter().any(|m| m == model) {
            models.push(model.to_string());
        }
    }

    if models.is_empty() {
        return Err(ConfigError::EmptyAllowList);
    }
    Ok(models)
}

fn parse_addr(
    key: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<SocketAddr, ConfigError> {
    let raw = value.unwrap_or_else(|| default.to_string());
    raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })
}
