//! Client configuration.

use crate::coordinator::DriverTimings;
use crate::failure_policy::{FailurePolicy, RetryWithBackoff, StallOnFailure};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// How remote failures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicyKind {
    /// Log and leave the match stalled.
    #[default]
    Stall,
    /// Retry with linear backoff, then stall.
    Retry,
}

/// Configuration for the tic-tac-toe client.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct ClientConfig {
    /// Base URL of the move-calculation service.
    #[serde(default = "default_server_url")]
    server_url: String,

    /// Delay between the human move and the remote request, in milliseconds.
    #[serde(default = "default_move_delay_ms")]
    move_delay_ms: u64,

    /// Delay before an automatic reset, in milliseconds.
    #[serde(default = "default_reset_delay_ms")]
    reset_delay_ms: u64,

    /// Optional per-request timeout in milliseconds. Unset waits forever.
    #[serde(default)]
    request_timeout_ms: Option<u64>,

    /// Remote failure handling.
    #[serde(default)]
    failure_policy: FailurePolicyKind,

    /// Retries allowed by the `retry` policy.
    #[serde(default = "default_retry_attempts")]
    retry_attempts: u32,

    /// Base backoff of the `retry` policy, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    retry_backoff_ms: u64,

    /// Where the terminal client writes its logs.
    #[serde(default = "default_log_file")]
    log_file: String,
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_move_delay_ms() -> u64 {
    750
}

fn default_reset_delay_ms() -> u64 {
    1500
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_log_file() -> String {
    "tictactoe_client.log".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            move_delay_ms: default_move_delay_ms(),
            reset_delay_ms: default_reset_delay_ms(),
            request_timeout_ms: None,
            failure_policy: FailurePolicyKind::default(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            log_file: default_log_file(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(server_url = %config.server_url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Driver delays.
    pub fn timings(&self) -> DriverTimings {
        DriverTimings {
            move_delay: Duration::from_millis(self.move_delay_ms),
            reset_delay: Duration::from_millis(self.reset_delay_ms),
        }
    }

    /// Per-request timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Builds the configured failure policy.
    pub fn build_failure_policy(&self) -> Arc<dyn FailurePolicy> {
        match self.failure_policy {
            FailurePolicyKind::Stall => Arc::new(StallOnFailure),
            FailurePolicyKind::Retry => Arc::new(RetryWithBackoff::new(
                self.retry_attempts,
                Duration::from_millis(self.retry_backoff_ms),
            )),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
