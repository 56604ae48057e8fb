//! Request payloads for the provider fetch operations.
//!
//! Optional knobs carry documented defaults matching the upstream helper
//! conventions (`adjust = qfq`, daily granularity, 60-minute intraday bars,
//! no extended-hours data) and are overridden through `with_*` builders.

use time::Date;

use crate::domain::{Adjust, CnMinutePeriod, CnPeriod, Symbol, UsInterval, UsIntradayInterval};
use crate::error::{FetchError, ValidationError};

fn validate_range(start: Date, end: Date) -> Result<(), FetchError> {
    if start > end {
        return Err(ValidationError::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Request for A-share daily/weekly/monthly K-lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnKlineRequest {
    pub symbol: Symbol,
    /// Inclusive start date.
    pub start: Date,
    /// Inclusive end date.
    pub end: Date,
    /// Defaults to [`Adjust::Qfq`].
    pub adjust: Adjust,
    /// Defaults to [`CnPeriod::Daily`].
    pub period: CnPeriod,
}

impl CnKlineRequest {
    pub fn new(symbol: Symbol, start: Date, end: Date) -> Result<Self, FetchError> {
        validate_range(start, end)?;
        Ok(Self {
            symbol,
            start,
            end,
            adjust: Adjust::default(),
            period: CnPeriod::default(),
        })
    }

    pub fn with_adjust(mut self, adjust: Adjust) -> Self {
        self.adjust = adjust;
        self
    }

    pub fn with_period(mut self, period: CnPeriod) -> Self {
        self.period = period;
        self
    }
}

/// Request for A-share intraday minute K-lines.
///
/// `start`/`end` are optional inclusive bounds; when absent the provider's
/// full available history is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnIntradayRequest {
    pub symbol: Symbol,
    pub start: Option<Date>,
    pub end: Option<Date>,
    /// Defaults to [`Adjust::Qfq`].
    pub adjust: Adjust,
    /// Defaults to [`CnMinutePeriod::SixtyMinutes`].
    pub period: CnMinutePeriod,
}

impl CnIntradayRequest {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            start: None,
            end: None,
            adjust: Adjust::default(),
            period: CnMinutePeriod::default(),
        }
    }

    pub fn with_start(mut self, start: Date) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: Date) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_adjust(mut self, adjust: Adjust) -> Self {
        self.adjust = adjust;
        self
    }

    pub fn with_period(mut self, period: CnMinutePeriod) -> Self {
        self.period = period;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), FetchError> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            validate_range(start, end)?;
        }
        Ok(())
    }
}

/// Request for U.S. daily/weekly/monthly K-lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsKlineRequest {
    pub symbol: Symbol,
    /// Inclusive start date.
    pub start: Date,
    /// Exclusive end date, matching the chart API's range semantics.
    pub end: Date,
    /// Defaults to [`UsInterval::OneDay`].
    pub interval: UsInterval,
    /// Include pre/post market bars. Defaults to `false`.
    pub prepost: bool,
}

impl UsKlineRequest {
    pub fn new(symbol: Symbol, start: Date, end: Date) -> Result<Self, FetchError> {
        validate_range(start, end)?;
        Ok(Self {
            symbol,
            start,
            end,
            interval: UsInterval::default(),
            prepost: false,
        })
    }

    pub fn with_interval(mut self, interval: UsInterval) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_prepost(mut self, prepost: bool) -> Self {
        self.prepost = prepost;
        self
    }
}

/// Request for U.S. intraday K-lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsIntradayRequest {
    pub symbol: Symbol,
    /// Inclusive start date.
    pub start: Date,
    /// Exclusive end date, matching the chart API's range semantics.
    pub end: Date,
    /// Defaults to [`UsIntradayInterval::SixtyMinutes`].
    pub interval: UsIntradayInterval,
    /// Include pre/post market bars. Defaults to `false`.
    pub prepost: bool,
}

impl UsIntradayRequest {
    pub fn new(symbol: Symbol, start: Date, end: Date) -> Result<Self, FetchError> {
        validate_range(start, end)?;
        Ok(Self {
            symbol,
            start,
            end,
            interval: UsIntradayInterval::default(),
            prepost: false,
        })
    }

    pub fn with_interval(mut self, interval: UsIntradayInterval) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_prepost(mut self, prepost: bool) -> Self {
        self.prepost = prepost;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;
    use time::macros::date;

    #[test]
    fn cn_request_defaults() {
        let request = CnKlineRequest::new(
            Symbol::parse("600519").expect("valid symbol"),
            date!(2024 - 01 - 01),
            date!(2024 - 06 - 30),
        )
        .expect("valid request");
        assert_eq!(request.adjust, Adjust::Qfq);
        assert_eq!(request.period, CnPeriod::Daily);
    }

    #[test]
    fn rejects_inverted_range() {
        let err = UsKlineRequest::new(
            Symbol::parse("AAPL").expect("valid symbol"),
            date!(2024 - 06 - 30),
            date!(2024 - 01 - 01),
        )
        .expect_err("must fail");
        assert_eq!(err.kind(), FetchErrorKind::InvalidParameter);
    }

    #[test]
    fn intraday_request_validates_optional_bounds() {
        let request = CnIntradayRequest::new(Symbol::parse("600519").expect("valid symbol"))
            .with_start(date!(2024 - 03 - 01))
            .with_end(date!(2024 - 02 - 01));
        let err = request.validate().expect_err("must fail");
        assert_eq!(err.kind(), FetchErrorKind::InvalidParameter);

        let open_ended = CnIntradayRequest::new(Symbol::parse("600519").expect("valid symbol"));
        open_ended.validate().expect("open range is valid");
    }
}
