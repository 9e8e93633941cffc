//! Ticker list parsing.
//!
//! Tickers come in as a comma separated string. Tokens are trimmed and
//! upper-cased, blank tokens are ignored, and a repeated ticker is rejected.
//! A ticker names a data file, so it may not contain path separators or
//! start with a dot.

use std::collections::HashSet;

/// Default cap on tickers per batch.
pub const DEFAULT_MAX_TICKERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickerListError {
    #[error("no tickers given")]
    Empty,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),

    #[error("invalid ticker: {0}")]
    InvalidTicker(String),
}

/// False for anything that could escape a data directory when used as a
/// file stem.
pub fn is_safe_ticker(ticker: &str) -> bool {
    !ticker.is_empty() && !ticker.starts_with('.') && !ticker.contains(['/', '\\'])
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, TickerListError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let ticker = token.trim().to_uppercase();
        if ticker.is_empty() {
            continue;
        }
        if !is_safe_ticker(&ticker) {
            return Err(TickerListError::InvalidTicker(ticker));
        }
        if !seen.insert(ticker.clone()) {
            return Err(TickerListError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    if tickers.is_empty() {
        return Err(TickerListError::Empty);
    }
    Ok(tickers)
}

/// Split `tickers` into the first `max` and the remainder.
pub fn limit_tickers(mut tickers: Vec<String>, max: usize) -> (Vec<String>, Vec<String>) {
    let dropped = if tickers.len() > max {
        tickers.split_off(max)
    } else {
        Vec::new()
    };
    (tickers, dropped)
}
