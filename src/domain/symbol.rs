use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 15;

/// Substrings that mark derivative instruments (indices, warrants, preferred
/// lines) on the supported providers. Tickers carrying any of these are
/// rejected before a network call is made.
pub const DERIVATIVE_MARKERS: [&str; 6] = ["=", "^", ".P", ".W", "-P", "-W"];

/// Returns the derivative marker contained in `input`, if any.
///
/// Pure predicate over [`DERIVATIVE_MARKERS`]; the uppercase comparison
/// matches how [`Symbol::parse`] normalizes tickers.
pub fn derivative_marker(input: &str) -> Option<&'static str> {
    let upper = input.to_ascii_uppercase();
    DERIVATIVE_MARKERS
        .into_iter()
        .find(|marker| upper.contains(marker))
}

/// Validated common-stock ticker.
///
/// Covers both U.S. tickers ("AAPL") and six-digit A-share codes ("600519").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a ticker to uppercase, rejecting derivative markers.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if let Some(marker) = derivative_marker(&normalized) {
            return Err(ValidationError::DerivativeSymbol {
                symbol: normalized,
                marker,
            });
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-';
            if !valid {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_us_ticker() {
        let parsed = Symbol::parse(" aapl ").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "AAPL");
    }

    #[test]
    fn accepts_a_share_code() {
        let parsed = Symbol::parse("600519").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "600519");
    }

    #[test]
    fn rejects_index_marker() {
        let err = Symbol::parse("^GSPC").expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::DerivativeSymbol { marker: "^", .. }
        ));
    }

    #[test]
    fn rejects_warrant_and_preferred_suffixes() {
        for (symbol, marker) in [
            ("FOO.W", ".W"),
            ("FOO.P", ".P"),
            ("FOO-W", "-W"),
            ("FOO-P", "-P"),
            ("EURUSD=X", "="),
        ] {
            let err = Symbol::parse(symbol).expect_err("must fail");
            assert_eq!(
                err,
                ValidationError::DerivativeSymbol {
                    symbol: symbol.to_ascii_uppercase(),
                    marker,
                }
            );
        }
    }

    #[test]
    fn marker_predicate_is_case_insensitive() {
        assert_eq!(derivative_marker("foo.w"), Some(".W"));
        assert_eq!(derivative_marker("600519"), None);
    }

    #[test]
    fn rejects_invalid_chars() {
        let err = Symbol::parse("AAPL$").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidChar { .. }));
    }
}
