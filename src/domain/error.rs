//! Domain error types.

use crate::domain::universe::TickerListError;

/// Top-level error type for goldencross.
#[derive(Debug, thiserror::Error)]
pub enum GoldenCrossError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid parameter {field}: {reason}")]
    InvalidParameters { field: String, reason: String },

    #[error(transparent)]
    TickerList(#[from] TickerListError),

    #[error("data unavailable for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("insufficient data for {ticker}: have {bars} bars, need {minimum}")]
    InsufficientData {
        ticker: String,
        bars: usize,
        minimum: usize,
    },

    #[error("export error: {reason}")]
    Export { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GoldenCrossError {
    /// Per-ticker conditions that skip a ticker instead of aborting a batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GoldenCrossError::DataUnavailable { .. } | GoldenCrossError::InsufficientData { .. }
        )
    }
}

impl From<csv::Error> for GoldenCrossError {
    fn from(err: csv::Error) -> Self {
        GoldenCrossError::Export {
            reason: err.to_string(),
        }
    }
}

impl From<&GoldenCrossError> for std::process::ExitCode {
    fn from(err: &GoldenCrossError) -> Self {
        let code: u8 = match err {
            GoldenCrossError::Io(_) => 1,
            GoldenCrossError::ConfigParse { .. }
            | GoldenCrossError::ConfigMissing { .. }
            | GoldenCrossError::ConfigInvalid { .. } => 2,
            GoldenCrossError::InvalidParameters { .. } => 3,
            GoldenCrossError::TickerList(_) => 4,
            GoldenCrossError::DataUnavailable { .. }
            | GoldenCrossError::InsufficientData { .. } => 5,
            GoldenCrossError::Export { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
