//! Market data port trait.

use crate::domain::error::GoldenCrossError;
use crate::domain::ohlcv::PriceBar;
use chrono::{Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Lookback period of a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    SixMonths,
    OneYear,
    TwoYears,
    #[default]
    FiveYears,
    Max,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::Max,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::Max => "max",
        }
    }

    fn months(self) -> Option<u32> {
        match self {
            Period::SixMonths => Some(6),
            Period::OneYear => Some(12),
            Period::TwoYears => Some(24),
            Period::FiveYears => Some(60),
            Period::Max => None,
        }
    }

    /// First date covered by the period when it ends on `end`; `None` for
    /// [`Period::Max`].
    pub fn start_date(self, end: NaiveDate) -> Option<NaiveDate> {
        let months = self.months()?;
        Some(
            end.checked_sub_months(Months::new(months))
                .unwrap_or(NaiveDate::MIN),
        )
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = GoldenCrossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| GoldenCrossError::InvalidParameters {
                field: "period".to_string(),
                reason: format!("unknown period '{}' (expected 6mo, 1y, 2y, 5y or max)", s.trim()),
            })
    }
}

/// Source of daily bars, ordered by date.
///
/// Any error, and an empty result, is treated by callers as the ticker's
/// data being unavailable.
pub trait MarketDataPort: Send + Sync {
    fn fetch(&self, ticker: &str, period: Period) -> Result<Vec<PriceBar>, GoldenCrossError>;
}
