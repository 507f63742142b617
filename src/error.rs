use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeeperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Remote calendar store failed during {operation}: {message}")]
    RemoteStore {
        operation: &'static str,
        message: String,
    },

    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl KeeperError {
    pub fn remote(operation: &'static str, message: impl std::fmt::Display) -> Self {
        KeeperError::RemoteStore {
            operation,
            message: message.to_string(),
        }
    }
}

/// Raised while loading configuration, before anything touches the network.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config line {line}: {content}")]
    Parse { line: usize, content: String },
}

pub type Result<T, E = KeeperError> = std::result::Result<T, E>;
