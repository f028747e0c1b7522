//! Environment-sourced agent configuration.
//!
//! All settings are read once at startup into an immutable [`AgentConfig`];
//! nothing below the config layer reads the environment. Variable names
//! match the deployed `.env` convention (see the table in `main.rs`).

use std::path::PathBuf;

use thiserror::Error;
use trafficwatch_core::tier::Thresholds;

/// Display name used when `SERVER_NAME` is not set.
pub const DEFAULT_SERVER_NAME: &str = "default-server";

/// State file name placed in the OS temp directory by default.
pub const DEFAULT_STATE_FILE_NAME: &str = "trafficwatch_state.json";

const DEFAULT_THRESHOLD_CRITICAL: f64 = 200.0;
const DEFAULT_THRESHOLD_WARNING: f64 = 300.0;
const DEFAULT_THRESHOLD_NOTICE: f64 = 500.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Immutable configuration for one monitor invocation.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub access_key: String,
    pub secret_key: String,
    /// Free-resource ids to query, from the comma-separated
    /// `FREE_RESOURCE_IDS`.
    pub resource_ids: Vec<String>,
    pub server_name: String,
    pub thresholds: Thresholds,
    /// Disables all debounce gating; for validating a deployment without
    /// waiting out real intervals.
    pub debug_mode: bool,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub state_file: PathBuf,
}

impl AgentConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration from an arbitrary lookup, for hermetic tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let access_key = required(&lookup, "HUAWEICLOUD_SDK_AK")?;
        let secret_key = required(&lookup, "HUAWEICLOUD_SDK_SK")?;

        let resource_ids: Vec<String> = required(&lookup, "FREE_RESOURCE_IDS")?
            .split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if resource_ids.is_empty() {
            return Err(ConfigError::Invalid {
                var: "FREE_RESOURCE_IDS",
                reason: "no resource ids listed".to_string(),
            });
        }

        let thresholds = Thresholds {
            critical: float_or(&lookup, "THRESHOLD_LEVEL_1", DEFAULT_THRESHOLD_CRITICAL)?,
            warning: float_or(&lookup, "THRESHOLD_LEVEL_2", DEFAULT_THRESHOLD_WARNING)?,
            notice: float_or(&lookup, "THRESHOLD_LEVEL_3", DEFAULT_THRESHOLD_NOTICE)?,
        };
        thresholds.validate().map_err(|e| ConfigError::Invalid {
            var: "THRESHOLD_LEVEL_1..3",
            reason: e.to_string(),
        })?;

        let debug_mode = lookup("DEBUG_MODE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "t"))
            .unwrap_or(false);

        let state_file = lookup("STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_STATE_FILE_NAME));

        Ok(Self {
            access_key,
            secret_key,
            resource_ids,
            server_name: lookup("SERVER_NAME").unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string()),
            thresholds,
            debug_mode,
            telegram_bot_token: lookup("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: lookup("TELEGRAM_CHAT_ID"),
            state_file,
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, ConfigError> {
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

fn float_or(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: f64,
) -> Result<f64, ConfigError> {
    match lookup(var) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            reason: format!("expected a number, got {value:?}"),
        }),
        None => Ok(default),
    }
}
