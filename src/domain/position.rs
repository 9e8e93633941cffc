//! Open positions and closed trades.

use crate::domain::annotate::AnnotatedBar;
use crate::domain::ohlcv::PriceBar;
use crate::domain::strategy::StrategyParameters;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Timeout,
}

impl ExitReason {
    pub const ALL: [ExitReason; 3] = [
        ExitReason::StopLoss,
        ExitReason::TakeProfit,
        ExitReason::Timeout,
    ];

    pub fn description(self) -> &'static str {
        match self {
            ExitReason::StopLoss => "Stop-loss hit",
            ExitReason::TakeProfit => "Target reached",
            ExitReason::Timeout => "Max holding period",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::StopLoss => "StopLoss",
            ExitReason::TakeProfit => "TakeProfit",
            ExitReason::Timeout => "Timeout",
        };
        f.write_str(s)
    }
}

/// A position entered at a signal bar's close and not yet resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub ticker: String,
    pub entry: PriceBar,
    pub take_profit_price: f64,
    pub stop_loss_price: f64,
    /// Last calendar date still inside the holding window.
    pub deadline: NaiveDate,
}

impl OpenPosition {
    pub fn open(ticker: &str, entry: &PriceBar, params: &StrategyParameters) -> Self {
        let entry_price = entry.close;
        Self {
            ticker: ticker.to_string(),
            entry: entry.clone(),
            take_profit_price: entry_price * (1.0 + params.take_profit_pct / 100.0),
            stop_loss_price: entry_price * (1.0 - params.stop_loss_pct / 100.0),
            deadline: entry
                .date
                .checked_add_days(Days::new(u64::from(params.max_holding_days)))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn entry_price(&self) -> f64 {
        self.entry.close
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        price <= self.stop_loss_price
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        price >= self.take_profit_price
    }

    pub fn in_window(&self, date: NaiveDate) -> bool {
        date >= self.entry.date && date <= self.deadline
    }

    /// Picks the exit among `window`, the bars after the entry bar that fall
    /// inside the holding window, in date order.
    ///
    /// Any stop-loss bar wins over every take-profit bar, even an earlier one.
    /// Without either, the last bar times out. An empty window has no exit.
    pub fn resolve_exit(&self, window: &[AnnotatedBar]) -> Option<(usize, ExitReason)> {
        if let Some(i) = window.iter().position(|b| self.should_stop_loss(b.close())) {
            return Some((i, ExitReason::StopLoss));
        }
        if let Some(i) = window.iter().position(|b| self.should_take_profit(b.close())) {
            return Some((i, ExitReason::TakeProfit));
        }
        window
            .len()
            .checked_sub(1)
            .map(|last| (last, ExitReason::Timeout))
    }

    pub fn close(self, exit: &PriceBar, reason: ExitReason) -> Trade {
        let entry_price = self.entry_price();
        Trade {
            ticker: self.ticker,
            entry_date: self.entry.date,
            entry_price,
            entry_open: self.entry.open,
            entry_high: self.entry.high,
            entry_low: self.entry.low,
            exit_date: exit.date,
            exit_price: exit.close,
            exit_open: exit.open,
            exit_high: exit.high,
            exit_low: exit.low,
            holding_days: (exit.date - self.entry.date).num_days(),
            return_pct: (exit.close / entry_price - 1.0) * 100.0,
            exit_reason: reason,
        }
    }
}

/// A closed position. Column names follow the trade export schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub entry_open: f64,
    pub entry_high: f64,
    pub entry_low: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub exit_open: f64,
    pub exit_high: f64,
    pub exit_low: f64,
    pub holding_days: i64,
    pub return_pct: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.return_pct > 0.0
    }
}
