//! Unified error handling for the stake watcher
//!
//! Errors raised before the poll loop starts (validation, wallet loading,
//! configuration) are fatal. Errors raised inside a poll cycle (queries,
//! submissions) are logged and turned into a skipped cycle.

use std::io;
use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for the stake watcher
#[derive(Debug, Error)]
pub enum WatcherError {
    /// Bad command line or configuration value
    #[error("Invalid parameter '{0}': {1}")]
    Validation(String, String),

    /// Price, balance or stake query failed (network, timeout, bad response)
    #[error("Query failed: {0}")]
    Query(String),

    /// Stake or unstake submission failed
    #[error("Submission failed: {0}")]
    Submission(String),

    /// Wallet or key file could not be loaded
    #[error("Wallet error: {0}")]
    Auth(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Journal write failed: {0}")]
    Journal(String),
}

impl WatcherError {
    pub fn validation(param: impl Into<String>, reason: impl Into<String>) -> Self {
        WatcherError::Validation(param.into(), reason.into())
    }

    /// Get a user-friendly error message with helpful context
    pub fn user_message(&self) -> String {
        match self {
            WatcherError::Validation(param, reason) => {
                format!(
                    "Invalid value for {}: {}\n\n\
                    💡 Check:\n\
                    - Amounts, thresholds and intervals are greater than zero\n\
                    - Tolerances and max actions are not negative",
                    param, reason
                )
            }
            WatcherError::Auth(msg) => {
                format!(
                    "Wallet could not be loaded: {}\n\n\
                    💡 Check:\n\
                    - --wallet.name and --wallet.hotkey are spelled correctly\n\
                    - The wallet directory exists (see `stake-watch status`)\n\
                    - coldkeypub.txt and the hotkey file are readable",
                    msg
                )
            }
            WatcherError::Config(err) => {
                format!(
                    "{}\n\n\
                    💡 Quick fix:\n\
                    1. Run: stake-watch init\n\
                    2. Edit stake-watch.toml\n\
                    3. Try again",
                    err
                )
            }
            WatcherError::Query(msg) => {
                format!(
                    "Chain query failed: {}\n\n\
                    💡 The gateway may be down or the network preset wrong",
                    msg
                )
            }
            _ => self.to_string(),
        }
    }

    /// Transient errors are retried on the next cycle
    pub fn is_retryable(&self) -> bool {
        matches!(self, WatcherError::Query(_) | WatcherError::Submission(_))
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            WatcherError::Validation(_, _) => "validation",
            WatcherError::Query(_) => "query",
            WatcherError::Submission(_) => "submission",
            WatcherError::Auth(_) => "auth",
            WatcherError::Config(_) => "config",
            WatcherError::Io(_) => "io",
            WatcherError::Journal(_) => "journal",
        }
    }

    /// Process exit code when this error aborts the program
    pub fn exit_code(&self) -> i32 {
        match self {
            WatcherError::Validation(_, _) => 2,
            _ => 1,
        }
    }
}

impl From<reqwest::Error> for WatcherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WatcherError::Query(format!("request timed out: {}", err))
        } else if err.is_decode() {
            WatcherError::Query(format!("malformed response: {}", err))
        } else {
            WatcherError::Query(err.to_string())
        }
    }
}

impl From<serde_json::Error> for WatcherError {
    fn from(err: serde_json::Error) -> Self {
        WatcherError::Journal(err.to_string())
    }
}

/// Result type alias for watcher operations
pub type WatcherResult<T> = Result<T, WatcherError>;
