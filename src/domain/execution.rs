//! Trade simulation.
//!
//! Every signal bar opens one [`OpenPosition`] at its close. The position is
//! resolved against the bars that follow it inside the holding window and
//! either closes into a [`Trade`] or, when no such bar exists, is dropped.

use tracing::debug;

use super::annotate::AnnotatedSeries;
use super::position::{OpenPosition, Trade};
use super::strategy::{OverlapPolicy, StrategyParameters};

/// Simulate the position opened at `entry_index`.
///
/// Returns `None` when the holding window holds no bar after the entry bar,
/// e.g. a signal on the last bar of the series.
pub fn simulate_trade(
    ticker: &str,
    series: &AnnotatedSeries,
    entry_index: usize,
    params: &StrategyParameters,
) -> Option<Trade> {
    let entry = series.bars.get(entry_index)?;
    let position = OpenPosition::open(ticker, &entry.bar, params);

    let after = &series.bars[entry_index + 1..];
    let window_len = after
        .iter()
        .take_while(|b| position.in_window(b.date()))
        .count();
    let window = &after[..window_len];

    let (offset, reason) = position.resolve_exit(window)?;
    Some(position.close(&window[offset].bar, reason))
}

/// Simulate every signal of `series` in date order.
pub fn simulate_trades(
    ticker: &str,
    series: &AnnotatedSeries,
    params: &StrategyParameters,
) -> Vec<Trade> {
    let mut trades: Vec<Trade> = Vec::new();

    for index in series.signal_indices() {
        let entry_date = series.bars[index].date();

        if params.overlap == OverlapPolicy::SuppressWhileOpen {
            if let Some(last) = trades.last() {
                if entry_date < last.exit_date {
                    debug!(%ticker, %entry_date, open_until = %last.exit_date, "signal suppressed");
                    continue;
                }
            }
        }

        match simulate_trade(ticker, series, index, params) {
            Some(trade) => {
                debug!(
                    %ticker,
                    %entry_date,
                    exit_date = %trade.exit_date,
                    reason = %trade.exit_reason,
                    return_pct = trade.return_pct,
                    "trade closed"
                );
                trades.push(trade);
            }
            None => debug!(%ticker, %entry_date, "no bars after entry, signal dropped"),
        }
    }

    trades
}
