//! Price series validation.
//!
//! A series must hold at least `long_window` bars before a full long moving
//! average exists; anything shorter is rejected as insufficient data.

use crate::domain::error::GoldenCrossError;
use crate::domain::ohlcv::PriceBar;

/// A borrowed series that has passed [`validate`].
#[derive(Debug, Clone, Copy)]
pub struct ValidSeries<'a> {
    bars: &'a [PriceBar],
}

impl<'a> ValidSeries<'a> {
    pub fn bars(&self) -> &'a [PriceBar] {
        self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

pub fn validate<'a>(
    ticker: &str,
    bars: &'a [PriceBar],
    long_window: usize,
) -> Result<ValidSeries<'a>, GoldenCrossError> {
    if bars.len() < long_window {
        return Err(GoldenCrossError::InsufficientData {
            ticker: ticker.to_string(),
            bars: bars.len(),
            minimum: long_window,
        });
    }
    Ok(ValidSeries { bars })
}
