//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) bars are undefined. n = 0 yields no values.

use crate::domain::ohlcv::PriceBar;

pub fn calculate_sma(bars: &[PriceBar], period: usize) -> Vec<Option<f64>> {
    let mut values = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        if period == 0 || i + 1 < period {
            values.push(None);
            continue;
        }
        // Summed per window rather than rolled so no drift accumulates.
        let window = &bars[i + 1 - period..=i];
        let sum: f64 = window.iter().map(|b| b.close).sum();
        values.push(Some(sum / period as f64));
    }

    values
}
