//! Canonical domain types for normalized K-line data.
//!
//! All types validate their invariants at construction time and carry full
//! serde support:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`KlineRecord`] | Normalized OHLCV observation |
//! | [`BandRecord`] | OHLCV observation plus Keltner Channel values |
//! | [`Symbol`] | Validated common-stock ticker |
//! | [`Adjust`] | Price adjustment method (qfq/hfq/none) |
//! | [`CnPeriod`] / [`CnMinutePeriod`] | A-share granularities |
//! | [`UsInterval`] / [`UsIntradayInterval`] | U.S. granularities |

mod adjust;
mod interval;
mod record;
mod symbol;

pub use adjust::Adjust;
pub use interval::{CnMinutePeriod, CnPeriod, UsInterval, UsIntradayInterval};
pub use record::{BandRecord, KlineRecord, KLINE_SCHEMA};
pub use symbol::{derivative_marker, Symbol, DERIVATIVE_MARKERS};
