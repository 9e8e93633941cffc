#![allow(dead_code)]

use chrono::NaiveDate;
use goldencross::domain::error::GoldenCrossError;
pub use goldencross::domain::ohlcv::PriceBar;
use goldencross::domain::strategy::{OverlapPolicy, StrategyParameters};
use goldencross::ports::data_port::{MarketDataPort, Period};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch(&self, ticker: &str, _period: Period) -> Result<Vec<PriceBar>, GoldenCrossError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(GoldenCrossError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }
}

/// Raises a cancel flag once `trip_after` fetches have been served.
pub struct CancellingDataPort {
    pub inner: MockDataPort,
    pub cancel: Arc<AtomicBool>,
    pub trip_after: usize,
    pub fetches: AtomicUsize,
}

impl MarketDataPort for CancellingDataPort {
    fn fetch(&self, ticker: &str, period: Period) -> Result<Vec<PriceBar>, GoldenCrossError> {
        let served = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        if served >= self.trip_after {
            self.cancel.store(true, Ordering::SeqCst);
        }
        self.inner.fetch(ticker, period)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
    }
}

/// Daily bars from `start_date`, one per close.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
        })
        .collect()
}

/// Oscillating closes, so that short/long averages cross repeatedly.
pub fn generate_bars(start_date: &str, count: usize, start_price: f64, phase: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| start_price + 10.0 * ((i as f64 + phase) / 7.0).sin() + i as f64 * 0.05)
        .collect();
    bars_from_closes(start_date, &closes)
}

/// Small windows with the 10% stop and 15% target of the classic preset.
pub fn small_params(max_holding_days: u32) -> StrategyParameters {
    StrategyParameters {
        short_window: 2,
        long_window: 3,
        max_holding_days,
        stop_loss_pct: 10.0,
        take_profit_pct: 15.0,
        overlap: OverlapPolicy::Independent,
    }
}

/// With `small_params`, the only crossover is on the sixth bar (close 100).
pub const CROSS_PREFIX: [f64; 6] = [120.0, 110.0, 100.0, 90.0, 85.0, 100.0];

pub fn with_cross_prefix(tail: &[f64]) -> Vec<PriceBar> {
    let mut closes = CROSS_PREFIX.to_vec();
    closes.extend_from_slice(tail);
    bars_from_closes("2024-01-01", &closes)
}
