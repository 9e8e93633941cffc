//! Trade statistics.
//!
//! Every metric is total: an empty trade set yields zeros, never NaN, and
//! ratios with a zero denominator fall back to zero.

use super::position::{ExitReason, Trade};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExitReasonCounts {
    pub stop_loss: usize,
    pub take_profit: usize,
    pub timeout: usize,
}

impl ExitReasonCounts {
    pub fn get(&self, reason: ExitReason) -> usize {
        match reason {
            ExitReason::StopLoss => self.stop_loss,
            ExitReason::TakeProfit => self.take_profit,
            ExitReason::Timeout => self.timeout,
        }
    }

    fn record(&mut self, reason: ExitReason) {
        match reason {
            ExitReason::StopLoss => self.stop_loss += 1,
            ExitReason::TakeProfit => self.take_profit += 1,
            ExitReason::Timeout => self.timeout += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.stop_loss + self.take_profit + self.timeout
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerSummary {
    pub ticker: String,
    pub trade_count: usize,
    pub winning_trades: usize,
    pub win_rate: f64,
    pub mean_return: f64,
    pub std_dev_return: f64,
    pub mean_holding_days: f64,
    pub mean_entry_price: f64,
}

impl TickerSummary {
    /// One summary per ticker, ordered by ticker.
    pub fn compute_per_ticker(trades: &[Trade]) -> Vec<TickerSummary> {
        let mut groups: BTreeMap<&str, Vec<&Trade>> = BTreeMap::new();
        for trade in trades {
            groups.entry(trade.ticker.as_str()).or_default().push(trade);
        }

        groups
            .into_iter()
            .map(|(ticker, group)| {
                let returns: Vec<f64> = group.iter().map(|t| t.return_pct).collect();
                let holding: Vec<f64> = group.iter().map(|t| t.holding_days as f64).collect();
                let entries: Vec<f64> = group.iter().map(|t| t.entry_price).collect();
                let winning_trades = group.iter().filter(|t| t.is_win()).count();

                TickerSummary {
                    ticker: ticker.to_string(),
                    trade_count: group.len(),
                    winning_trades,
                    win_rate: percentage(winning_trades, group.len()),
                    mean_return: mean(&returns),
                    std_dev_return: sample_std_dev(&returns),
                    mean_holding_days: mean(&holding),
                    mean_entry_price: mean(&entries),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    /// Everything not strictly profitable, break-even included.
    pub losing_trades: usize,
    /// Percentage in [0, 100].
    pub win_rate: f64,
    pub mean_return: f64,
    pub std_dev_return: f64,
    pub sharpe_ratio: f64,
    pub mean_holding_days: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub exit_reasons: ExitReasonCounts,
    pub per_ticker: Vec<TickerSummary>,
}

impl PortfolioSummary {
    pub fn compute(trades: &[Trade]) -> Self {
        let returns: Vec<f64> = trades.iter().map(|t| t.return_pct).collect();
        let holding: Vec<f64> = trades.iter().map(|t| t.holding_days as f64).collect();

        let (wins, losses): (Vec<f64>, Vec<f64>) = returns.iter().partition(|&&r| r > 0.0);

        let mut exit_reasons = ExitReasonCounts::default();
        for trade in trades {
            exit_reasons.record(trade.exit_reason);
        }

        let mean_return = mean(&returns);
        let std_dev_return = sample_std_dev(&returns);
        let sharpe_ratio = if std_dev_return != 0.0 {
            mean_return / std_dev_return
        } else {
            0.0
        };

        PortfolioSummary {
            total_trades: trades.len(),
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            win_rate: percentage(wins.len(), trades.len()),
            mean_return,
            std_dev_return,
            sharpe_ratio,
            mean_holding_days: mean(&holding),
            avg_win: mean(&wins),
            avg_loss: mean(&losses),
            exit_reasons,
            per_ticker: TickerSummary::compute_per_ticker(trades),
        }
    }

    pub fn tickers_traded(&self) -> usize {
        self.per_ticker.len()
    }
}

pub fn summarize(trades: &[Trade]) -> PortfolioSummary {
    PortfolioSummary::compute(trades)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); 0 below two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_trade(ticker: &str, return_pct: f64, days: i64, reason: ExitReason) -> Trade {
        let entry_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let entry_price = 100.0;
        let exit_price = entry_price * (1.0 + return_pct / 100.0);
        Trade {
            ticker: ticker.to_string(),
            entry_date,
            entry_price,
            entry_open: entry_price,
            entry_high: entry_price,
            entry_low: entry_price,
            exit_date: entry_date + chrono::Duration::days(days),
            exit_price,
            exit_open: exit_price,
            exit_high: exit_price,
            exit_low: exit_price,
            holding_days: days,
            return_pct,
            exit_reason: reason,
        }
    }

    #[test]
    fn empty_trade_set_is_all_zero() {
        let s = summarize(&[]);
        assert_eq!(s.total_trades, 0);
        assert_eq!(s.winning_trades, 0);
        assert_eq!(s.losing_trades, 0);
        assert_eq!(s.win_rate, 0.0);
        assert_eq!(s.mean_return, 0.0);
        assert_eq!(s.std_dev_return, 0.0);
        assert_eq!(s.sharpe_ratio, 0.0);
        assert_eq!(s.mean_holding_days, 0.0);
        assert_eq!(s.avg_win, 0.0);
        assert_eq!(s.avg_loss, 0.0);
        assert_eq!(s.exit_reasons.total(), 0);
        assert!(s.per_ticker.is_empty());
    }

    #[test]
    fn single_trade_has_zero_deviation() {
        let s = summarize(&[make_trade("MSFT", 15.0, 10, ExitReason::TakeProfit)]);
        assert_eq!(s.total_trades, 1);
        assert_eq!(s.std_dev_return, 0.0);
        assert_eq!(s.sharpe_ratio, 0.0);
        assert_eq!(s.win_rate, 100.0);
    }

    #[test]
    fn wins_losses_and_breakeven() {
        let trades = vec![
            make_trade("MSFT", 10.0, 5, ExitReason::Timeout),
            make_trade("MSFT", -10.0, 3, ExitReason::StopLoss),
            make_trade("AAPL", 0.0, 60, ExitReason::Timeout),
            make_trade("AAPL", 20.0, 12, ExitReason::TakeProfit),
        ];
        let s = summarize(&trades);

        assert_eq!(s.total_trades, 4);
        assert_eq!(s.winning_trades, 2);
        assert_eq!(s.losing_trades, 2);
        assert_relative_eq!(s.win_rate, 50.0);
        assert_relative_eq!(s.mean_return, 5.0);
        assert_relative_eq!(s.avg_win, 15.0);
        assert_relative_eq!(s.avg_loss, -5.0);
        assert_relative_eq!(s.mean_holding_days, 20.0);
    }

    #[test]
    fn sample_standard_deviation_and_sharpe() {
        let trades = vec![
            make_trade("MSFT", 2.0, 1, ExitReason::Timeout),
            make_trade("MSFT", 4.0, 1, ExitReason::Timeout),
            make_trade("MSFT", 4.0, 1, ExitReason::Timeout),
            make_trade("MSFT", 4.0, 1, ExitReason::Timeout),
            make_trade("MSFT", 5.0, 1, ExitReason::Timeout),
            make_trade("MSFT", 5.0, 1, ExitReason::Timeout),
            make_trade("MSFT", 7.0, 1, ExitReason::Timeout),
            make_trade("MSFT", 9.0, 1, ExitReason::Timeout),
        ];
        let s = summarize(&trades);
        // Population sd is 2; sample sd is 2 * sqrt(8/7).
        let expected = 2.0 * (8.0_f64 / 7.0).sqrt();
        assert_relative_eq!(s.std_dev_return, expected, epsilon = 1e-12);
        assert_relative_eq!(s.sharpe_ratio, 5.0 / expected, epsilon = 1e-12);
    }

    #[test]
    fn identical_returns_have_zero_sharpe() {
        let trades = vec![
            make_trade("MSFT", 3.0, 1, ExitReason::Timeout),
            make_trade("MSFT", 3.0, 1, ExitReason::Timeout),
        ];
        let s = summarize(&trades);
        assert_eq!(s.std_dev_return, 0.0);
        assert_eq!(s.sharpe_ratio, 0.0);
    }

    #[test]
    fn exit_reason_counts() {
        let trades = vec![
            make_trade("MSFT", -10.0, 3, ExitReason::StopLoss),
            make_trade("MSFT", 15.0, 3, ExitReason::TakeProfit),
            make_trade("MSFT", 16.0, 3, ExitReason::TakeProfit),
            make_trade("MSFT", 1.0, 60, ExitReason::Timeout),
        ];
        let counts = summarize(&trades).exit_reasons;
        assert_eq!(counts.get(ExitReason::StopLoss), 1);
        assert_eq!(counts.get(ExitReason::TakeProfit), 2);
        assert_eq!(counts.get(ExitReason::Timeout), 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn per_ticker_breakdown() {
        let trades = vec![
            make_trade("TSLA", 10.0, 4, ExitReason::Timeout),
            make_trade("AAPL", -5.0, 2, ExitReason::StopLoss),
            make_trade("TSLA", 20.0, 8, ExitReason::TakeProfit),
        ];
        let s = summarize(&trades);

        assert_eq!(s.tickers_traded(), 2);
        let aapl = &s.per_ticker[0];
        let tsla = &s.per_ticker[1];

        assert_eq!(aapl.ticker, "AAPL");
        assert_eq!(aapl.trade_count, 1);
        assert_eq!(aapl.std_dev_return, 0.0);
        assert_eq!(aapl.win_rate, 0.0);

        assert_eq!(tsla.ticker, "TSLA");
        assert_eq!(tsla.trade_count, 2);
        assert_relative_eq!(tsla.mean_return, 15.0);
        assert_relative_eq!(tsla.std_dev_return, 50.0_f64.sqrt());
        assert_relative_eq!(tsla.mean_holding_days, 6.0);
        assert_relative_eq!(tsla.mean_entry_price, 100.0);
        assert_relative_eq!(tsla.win_rate, 100.0);
    }

    #[test]
    fn helpers_on_empty_input() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(sample_std_dev(&[]), 0.0);
        assert_eq!(sample_std_dev(&[4.2]), 0.0);
    }
}
