use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical field names of a normalized K-line record, in the order the
/// providers' tables are projected.
pub const KLINE_SCHEMA: [&str; 6] = ["date", "open", "close", "high", "low", "volume"];

/// One normalized OHLCV observation.
///
/// `date` is a calendar date (`YYYY-MM-DD`) for daily and coarser
/// granularities and a date-time (`YYYY-MM-DD HH:MM:SS`) for intraday bars.
/// Records are immutable once constructed and ordered ascending by `date`
/// within a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlineRecord {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl KlineRecord {
    pub fn new(
        date: impl Into<String>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, ValidationError> {
        validate_positive("open", open)?;
        validate_positive("high", high)?;
        validate_positive("low", low)?;
        validate_positive("close", close)?;
        validate_non_negative("volume", volume)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            date: date.into(),
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// True range of this bar given the previous close.
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// A [`KlineRecord`] extended with Keltner Channel values.
///
/// Invariants hold by construction: `upper = middle + multiplier * atr`,
/// `lower = middle - multiplier * atr`, `atr >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandRecord {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub middle: f64,
    pub atr: f64,
    pub upper: f64,
    pub lower: f64,
}

impl BandRecord {
    pub fn from_record(record: &KlineRecord, middle: f64, atr: f64, multiplier: f64) -> Self {
        Self {
            date: record.date.clone(),
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
            middle,
            atr,
            upper: middle + multiplier * atr,
            lower: middle - multiplier * atr,
        }
    }
}

fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
