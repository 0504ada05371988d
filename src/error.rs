use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Config directory not found at {0}. Run 'piv init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Panel '{0}' not found in panels.toml")]
    PanelNotFound(String),

    #[error("Invalid billing period {year}-{month}: {reason}")]
    InvalidPeriod {
        year: i32,
        month: u32,
        reason: &'static str,
    },

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BillingError>;
