//! # Tickline
//!
//! K-line (candlestick) fetching and Keltner Channel computation for
//! common-stock tickers in Chinese A-shares and U.S. markets.
//!
//! ## Overview
//!
//! - **Provider adapters** fetch OHLCV tables from upstream market-data
//!   APIs: Eastmoney for A-shares, the Yahoo chart endpoint for U.S.
//!   equities. One attempt per call; upstream failures propagate unchanged.
//! - **Normalization** maps each provider's column names onto the canonical
//!   `{date, open, close, high, low, volume}` schema through explicit,
//!   validated column maps and sorts records ascending by date.
//! - **Indicators** extend a normalized series with Keltner Channel values
//!   (`middle`, `atr`, `upper`, `lower`) as a pure transform.
//!
//! Derivative instruments (indices, warrants, preferred lines) are rejected
//! at [`Symbol`] construction, before any network call.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Eastmoney, Yahoo) |
//! | [`domain`] | Canonical records, symbols, granularity enums |
//! | [`error`] | Validation and fetch error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`indicators`] | Keltner Channel computation |
//! | [`normalize`] | Column maps and table normalization |
//! | [`request`] | Fetch request payloads with documented defaults |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tickline::{
//!     keltner_channels, CnKlineRequest, EastmoneyProvider, KeltnerConfig, Symbol,
//! };
//! use time::macros::date;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = EastmoneyProvider::new();
//!     let request = CnKlineRequest::new(
//!         Symbol::parse("600519")?,
//!         date!(2024 - 01 - 01),
//!         date!(2024 - 06 - 30),
//!     )?;
//!
//!     let records = provider.kline(&request).await?;
//!     let bands = keltner_channels(&records, &KeltnerConfig::default())?;
//!
//!     if let Some(band) = bands.last() {
//!         println!("{}: middle {:.2}, upper {:.2}", band.date, band.middle, band.upper);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod indicators;
pub mod normalize;
pub mod request;

pub use adapters::{EastmoneyProvider, YahooProvider};
pub use domain::{
    derivative_marker, Adjust, BandRecord, CnMinutePeriod, CnPeriod, KlineRecord, Symbol,
    UsInterval, UsIntradayInterval, DERIVATIVE_MARKERS, KLINE_SCHEMA,
};
pub use error::{FetchError, FetchErrorKind, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use indicators::{keltner_channels, KeltnerConfig};
pub use normalize::{normalize_records, parse_kline_date, ColumnMap, RawTable};
pub use request::{CnIntradayRequest, CnKlineRequest, UsIntradayRequest, UsKlineRequest};
