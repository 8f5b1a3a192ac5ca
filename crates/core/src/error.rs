use thiserror::Error;

/// Top-level error type used across the entire workspace.
#[derive(Debug, Error)]
pub enum BatteryError {
    #[error("cannot aggregate an empty sample group")]
    EmptyGroup,

    #[error("invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("chart error: {0}")]
    Chart(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = BatteryError> = std::result::Result<T, E>;
