//! Batch backtest runner.
//!
//! Runs validate → annotate → detect → simulate for each ticker against a
//! [`MarketDataPort`], then summarizes the merged trades. Tickers are
//! independent, so they may run on the rayon pool; results are reassembled
//! in input order. A ticker that cannot be analysed is recorded and skipped,
//! it never aborts the batch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{info, warn};

use super::annotate::{annotate, AnnotatedSeries};
use super::error::GoldenCrossError;
use super::execution::simulate_trades;
use super::metrics::PortfolioSummary;
use super::ohlcv::{is_strictly_increasing, PriceBar};
use super::position::Trade;
use super::series::validate;
use super::signal::detect_signals;
use super::strategy::StrategyParameters;
use crate::ports::data_port::{MarketDataPort, Period};

/// Pipeline output for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerAnalysis {
    pub ticker: String,
    pub bars: usize,
    pub signals: usize,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTicker {
    pub ticker: String,
    pub bars: usize,
    pub minimum: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedTicker {
    pub ticker: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub trades: Vec<Trade>,
    pub summary: PortfolioSummary,
    /// Tickers that ran to completion, with or without trades.
    pub analyzed: Vec<TickerAnalysis>,
    /// Tickers with fewer bars than the long window.
    pub skipped: Vec<SkippedTicker>,
    /// Tickers whose data could not be obtained.
    pub failed_tickers: Vec<FailedTicker>,
    /// Tickers never started because the batch was cancelled.
    pub cancelled: Vec<String>,
}

impl BatchResult {
    pub fn failed_ticker_names(&self) -> Vec<&str> {
        self.failed_tickers.iter().map(|f| f.ticker.as_str()).collect()
    }

    pub fn was_cancelled(&self) -> bool {
        !self.cancelled.is_empty()
    }
}

enum TickerOutcome {
    Analyzed(TickerAnalysis),
    Skipped(SkippedTicker),
    Failed(FailedTicker),
    Cancelled(String),
}

/// Run the full pipeline over one in-memory series.
pub fn analyze_series(
    ticker: &str,
    bars: &[PriceBar],
    params: &StrategyParameters,
) -> Result<TickerAnalysis, GoldenCrossError> {
    let valid = validate(ticker, bars, params.long_window)?;
    let series = detect_signals(annotate(
        valid.bars(),
        params.short_window,
        params.long_window,
    ));
    let trades = simulate_trades(ticker, &series, params);

    Ok(TickerAnalysis {
        ticker: ticker.to_string(),
        bars: valid.len(),
        signals: series.signal_count(),
        trades,
    })
}

pub struct BatchRunner<'a> {
    data_port: &'a dyn MarketDataPort,
    parallel: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(data_port: &'a dyn MarketDataPort) -> Self {
        Self {
            data_port,
            parallel: true,
            cancel: None,
        }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Flag checked before each ticker starts; setting it stops the batch
    /// from picking up further tickers.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn run(
        &self,
        tickers: &[String],
        params: StrategyParameters,
        period: Period,
    ) -> Result<BatchResult, GoldenCrossError> {
        params.validate()?;
        if params.has_inverted_windows() {
            warn!(
                short_window = params.short_window,
                long_window = params.long_window,
                "short window is not shorter than long window"
            );
        }

        let outcomes: Vec<TickerOutcome> = if self.parallel {
            tickers
                .par_iter()
                .map(|ticker| self.run_ticker(ticker, &params, period))
                .collect()
        } else {
            tickers
                .iter()
                .map(|ticker| self.run_ticker(ticker, &params, period))
                .collect()
        };

        let mut result = BatchResult {
            trades: Vec::new(),
            summary: PortfolioSummary::compute(&[]),
            analyzed: Vec::new(),
            skipped: Vec::new(),
            failed_tickers: Vec::new(),
            cancelled: Vec::new(),
        };

        for outcome in outcomes {
            match outcome {
                TickerOutcome::Analyzed(analysis) => {
                    result.trades.extend(analysis.trades.iter().cloned());
                    result.analyzed.push(analysis);
                }
                TickerOutcome::Skipped(skipped) => result.skipped.push(skipped),
                TickerOutcome::Failed(failed) => result.failed_tickers.push(failed),
                TickerOutcome::Cancelled(ticker) => result.cancelled.push(ticker),
            }
        }

        result.summary = PortfolioSummary::compute(&result.trades);
        Ok(result)
    }

    /// Annotated and signal-flagged series for charting, independent of any
    /// trade simulation.
    pub fn annotated_series(
        &self,
        ticker: &str,
        params: StrategyParameters,
        period: Period,
    ) -> Result<AnnotatedSeries, GoldenCrossError> {
        params.validate()?;
        let bars = self.fetch(ticker, period)?;
        Ok(detect_signals(annotate(
            &bars,
            params.short_window,
            params.long_window,
        )))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn fetch(&self, ticker: &str, period: Period) -> Result<Vec<PriceBar>, GoldenCrossError> {
        let bars = self.data_port.fetch(ticker, period).map_err(|e| match e {
            e if e.is_recoverable() => e,
            other => GoldenCrossError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: other.to_string(),
            },
        })?;
        if bars.is_empty() {
            return Err(GoldenCrossError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: "no bars returned".to_string(),
            });
        }
        if !is_strictly_increasing(&bars) {
            return Err(GoldenCrossError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: "bars are not in strictly increasing date order".to_string(),
            });
        }
        Ok(bars)
    }

    fn run_ticker(
        &self,
        ticker: &str,
        params: &StrategyParameters,
        period: Period,
    ) -> TickerOutcome {
        if self.is_cancelled() {
            info!(%ticker, "batch cancelled, ticker not started");
            return TickerOutcome::Cancelled(ticker.to_string());
        }

        let bars = match self.fetch(ticker, period) {
            Ok(bars) => bars,
            Err(GoldenCrossError::InsufficientData { bars, minimum, .. }) => {
                warn!(%ticker, bars, minimum, "insufficient data, ticker skipped");
                return TickerOutcome::Skipped(SkippedTicker {
                    ticker: ticker.to_string(),
                    bars,
                    minimum,
                });
            }
            Err(e) => {
                warn!(%ticker, error = %e, "skipping ticker");
                return TickerOutcome::Failed(FailedTicker {
                    ticker: ticker.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        match analyze_series(ticker, &bars, params) {
            Ok(analysis) => {
                info!(
                    %ticker,
                    bars = analysis.bars,
                    signals = analysis.signals,
                    trades = analysis.trades.len(),
                    "ticker analysed"
                );
                TickerOutcome::Analyzed(analysis)
            }
            Err(GoldenCrossError::InsufficientData { bars, minimum, .. }) => {
                warn!(%ticker, bars, minimum, "insufficient data, ticker skipped");
                TickerOutcome::Skipped(SkippedTicker {
                    ticker: ticker.to_string(),
                    bars,
                    minimum,
                })
            }
            Err(e) => {
                warn!(%ticker, error = %e, "ticker failed");
                TickerOutcome::Failed(FailedTicker {
                    ticker: ticker.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
