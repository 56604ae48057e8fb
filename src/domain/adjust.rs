use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Price adjustment method for A-share series.
///
/// `Qfq` (forward-adjusted) and `Hfq` (backward-adjusted) compensate for
/// corporate actions; `None` keeps raw prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Adjust {
    #[default]
    #[serde(rename = "qfq")]
    Qfq,
    #[serde(rename = "hfq")]
    Hfq,
    #[serde(rename = "none")]
    None,
}

impl Adjust {
    pub const ALL: [Self; 3] = [Self::Qfq, Self::Hfq, Self::None];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Qfq => "qfq",
            Self::Hfq => "hfq",
            Self::None => "none",
        }
    }

    /// `fqt` query parameter on the Eastmoney kline endpoint.
    pub(crate) const fn fqt(self) -> &'static str {
        match self {
            Self::None => "0",
            Self::Qfq => "1",
            Self::Hfq => "2",
        }
    }
}

impl Display for Adjust {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Adjust {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "qfq" => Ok(Self::Qfq),
            "hfq" => Ok(Self::Hfq),
            "none" | "" => Ok(Self::None),
            other => Err(ValidationError::InvalidAdjust {
                value: other.to_owned(),
            }),
        }
    }
}
