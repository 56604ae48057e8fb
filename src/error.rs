use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Validation errors raised before any upstream call is attempted.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error(
        "symbol '{symbol}' contains derivative marker '{marker}'; provide a common stock ticker"
    )]
    DerivativeSymbol { symbol: String, marker: &'static str },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid adjust '{value}', expected one of qfq, hfq, none")]
    InvalidAdjust { value: String },
    #[error("invalid period '{value}', expected one of daily, weekly, monthly")]
    InvalidPeriod { value: String },
    #[error("invalid minute period '{value}', expected one of 1, 5, 15, 30, 60")]
    InvalidMinutePeriod { value: String },
    #[error("invalid interval '{value}', expected one of 1d, 1wk, 1mo")]
    InvalidInterval { value: String },
    #[error("invalid intraday interval '{value}', expected one of 1m, 2m, 5m, 15m, 30m, 60m, 90m")]
    InvalidIntradayInterval { value: String },

    #[error("window must be at least 1")]
    InvalidWindow,
    #[error("atr multiplier must be positive and finite, got {value}")]
    InvalidMultiplier { value: f64 },
    #[error("start date '{start}' is after end date '{end}'")]
    InvalidDateRange { start: String, end: String },

    #[error("date '{value}' is not a calendar date or date-time")]
    InvalidDate { value: String },
    #[error("column map target '{field}' is not a canonical K-line field")]
    UnknownCanonicalField { field: String },
    #[error("column map must cover each canonical K-line field exactly once")]
    IncompleteColumnMap,
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be positive")]
    NonPositiveValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("record high must be >= low")]
    InvalidBarRange,
    #[error("record open/close must be within high/low range")]
    InvalidBarBounds,
}

/// Error classification for provider fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Ticker matched a rejected derivative-market pattern or failed to parse.
    InvalidSymbol,
    /// Out-of-range window/multiplier, bad date range, or unsupported option.
    InvalidParameter,
    /// Transport failure or malformed response from a provider, passed through
    /// unchanged; never retried internally.
    Upstream,
}

/// Structured error returned by provider calls and the band calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    retryable: bool,
}

impl FetchError {
    pub fn invalid_symbol(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::InvalidSymbol,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::InvalidParameter,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Upstream,
            message: message.into(),
            retryable: true,
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::InvalidSymbol => "kline.invalid_symbol",
            FetchErrorKind::InvalidParameter => "kline.invalid_parameter",
            FetchErrorKind::Upstream => "kline.upstream",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

impl From<ValidationError> for FetchError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::EmptySymbol
            | ValidationError::SymbolTooLong { .. }
            | ValidationError::DerivativeSymbol { .. }
            | ValidationError::SymbolInvalidChar { .. } => Self::invalid_symbol(error.to_string()),
            _ => Self::invalid_parameter(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivative_symbol_maps_to_invalid_symbol_kind() {
        let error = FetchError::from(ValidationError::DerivativeSymbol {
            symbol: String::from("AAPL-P"),
            marker: "-P",
        });
        assert_eq!(error.kind(), FetchErrorKind::InvalidSymbol);
        assert_eq!(error.code(), "kline.invalid_symbol");
        assert!(!error.retryable());
    }

    #[test]
    fn window_error_maps_to_invalid_parameter_kind() {
        let error = FetchError::from(ValidationError::InvalidWindow);
        assert_eq!(error.kind(), FetchErrorKind::InvalidParameter);
    }

    #[test]
    fn upstream_errors_are_flagged_retryable() {
        let error = FetchError::upstream("eastmoney returned status 502");
        assert!(error.retryable());
        assert_eq!(error.code(), "kline.upstream");
    }
}
