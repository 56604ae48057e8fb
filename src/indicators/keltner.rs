//! Keltner Channel computation over normalized K-line records.

use crate::domain::{BandRecord, KlineRecord};
use crate::error::{FetchError, ValidationError};

/// Keltner Channel parameters.
///
/// `window` is the rolling window for both the middle line (simple moving
/// average of close) and the ATR; `atr_multiplier` scales the band width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeltnerConfig {
    /// Rolling window size. Must be at least 1. Defaults to 20.
    pub window: usize,
    /// Band width in ATR units. Must be positive and finite. Defaults to 2.0.
    pub atr_multiplier: f64,
}

impl Default for KeltnerConfig {
    fn default() -> Self {
        Self {
            window: 20,
            atr_multiplier: 2.0,
        }
    }
}

impl KeltnerConfig {
    pub fn new(window: usize, atr_multiplier: f64) -> Result<Self, ValidationError> {
        let config = Self {
            window,
            atr_multiplier,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.window < 1 {
            return Err(ValidationError::InvalidWindow);
        }
        if !self.atr_multiplier.is_finite() || self.atr_multiplier <= 0.0 {
            return Err(ValidationError::InvalidMultiplier {
                value: self.atr_multiplier,
            });
        }
        Ok(())
    }
}

/// Compute Keltner Channels over an ascending-by-date record sequence.
///
/// Per input record `i` the true range is `high - low` for `i = 0` and
/// `max(high - low, |high - prev_close|, |low - prev_close|)` afterwards;
/// the middle line and ATR are simple moving averages of close and true
/// range over `config.window` records.
///
/// Warm-up records are omitted: the first output corresponds to input index
/// `window - 1`, so the output holds `N - window + 1` records for `N >=
/// window` and is empty for shorter inputs. A pure function; identical
/// inputs produce bit-identical outputs.
pub fn keltner_channels(
    records: &[KlineRecord],
    config: &KeltnerConfig,
) -> Result<Vec<BandRecord>, FetchError> {
    config.validate()?;

    let window = config.window;
    if records.len() < window {
        return Ok(Vec::new());
    }

    let mut bands = Vec::with_capacity(records.len() - window + 1);
    let mut close_sum = 0.0;
    let mut tr_sum = 0.0;
    // Rolling true ranges, needed to subtract the value leaving the window.
    let mut true_ranges = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let tr = if i == 0 {
            record.high - record.low
        } else {
            record.true_range(records[i - 1].close)
        };
        true_ranges.push(tr);

        close_sum += record.close;
        tr_sum += tr;
        if i >= window {
            close_sum -= records[i - window].close;
            tr_sum -= true_ranges[i - window];
        }

        if i + 1 >= window {
            let middle = close_sum / window as f64;
            let atr = tr_sum / window as f64;
            bands.push(BandRecord::from_record(
                record,
                middle,
                atr,
                config.atr_multiplier,
            ));
        }
    }

    Ok(bands)
}
