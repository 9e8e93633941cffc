//! Moving average annotation of a price series.
//!
//! Builds a new [`AnnotatedSeries`] from a borrowed slice of bars; the input
//! is never modified, so one series can be annotated with several window
//! pairs side by side.

use crate::domain::indicator::calculate_sma;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedBar {
    pub bar: PriceBar,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub signal: bool,
}

impl AnnotatedBar {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }

    /// Both averages, when both are defined.
    pub fn averages(&self) -> Option<(f64, f64)> {
        Some((self.short_ma?, self.long_ma?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSeries {
    pub short_window: usize,
    pub long_window: usize,
    pub bars: Vec<AnnotatedBar>,
}

impl AnnotatedSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn signal_indices(&self) -> Vec<usize> {
        self.bars
            .iter()
            .enumerate()
            .filter(|(_, b)| b.signal)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn signal_count(&self) -> usize {
        self.bars.iter().filter(|b| b.signal).count()
    }
}

pub fn annotate(bars: &[PriceBar], short_window: usize, long_window: usize) -> AnnotatedSeries {
    let short = calculate_sma(bars, short_window);
    let long = calculate_sma(bars, long_window);

    let annotated = bars
        .iter()
        .zip(short)
        .zip(long)
        .map(|((bar, short_ma), long_ma)| AnnotatedBar {
            bar: bar.clone(),
            short_ma,
            long_ma,
            signal: false,
        })
        .collect();

    AnnotatedSeries {
        short_window,
        long_window,
        bars: annotated,
    }
}
