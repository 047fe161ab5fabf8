use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Validation and contract errors exposed by `tickline-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("timestamp must be RFC3339, YYYY-MM-DD or epoch milliseconds: '{value}'")]
    InvalidTimestamp { value: String },
    #[error("utc offset must look like +05:30 or -04:00: '{value}'")]
    InvalidUtcOffset { value: String },

    #[error("invalid range '{value}', expected one of 1d, 1w, 1m, 1y")]
    InvalidRange { value: String },
    #[error("invalid indicator '{value}', expected one of none, ma, ema")]
    InvalidIndicator { value: String },
    #[error("indicator period must be at least 1")]
    ZeroPeriod,

    #[error("invalid timeframe '{value}', expected short-term or long-term")]
    InvalidTimeframe { value: String },
    #[error("prediction end date {end} is before start date {start}")]
    InvertedDateWindow { start: String, end: String },

    #[error("configuration value '{key}' is invalid: '{value}'")]
    InvalidConfig { key: &'static str, value: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure classification for snapshot, history, suggestion and stream loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// Transport or connection failure.
    Network,
    /// Well-formed response that lacks a required field.
    DataUnavailable,
}

/// Structured load error surfaced to the view model as a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    kind: LoadErrorKind,
    message: String,
}

impl LoadError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: LoadErrorKind::Network,
            message: message.into(),
        }
    }

    pub fn data_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: LoadErrorKind::DataUnavailable,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> LoadErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            LoadErrorKind::Network => "load.network",
            LoadErrorKind::DataUnavailable => "load.data_unavailable",
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for LoadError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_display_includes_code() {
        let error = LoadError::data_unavailable("price data not available");
        assert_eq!(error.kind(), LoadErrorKind::DataUnavailable);
        assert_eq!(
            error.to_string(),
            "price data not available (load.data_unavailable)"
        );
    }
}
