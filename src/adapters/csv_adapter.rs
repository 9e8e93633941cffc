//! CSV file market data adapter.
//!
//! Reads `<base_path>/<TICKER>.csv`. Columns are located by header name
//! (`date`, `open`, `high`, `low`, `close`, case-insensitive); any other
//! column, such as `Adj Close` or `Volume`, is ignored. Periods are anchored
//! at the latest bar in the file.

use crate::domain::error::GoldenCrossError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::universe::is_safe_ticker;
use crate::ports::data_port::{MarketDataPort, Period};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    /// Tickers with a data file in the base directory, sorted.
    pub fn list_tickers(&self) -> Result<Vec<String>, GoldenCrossError> {
        let mut tickers = Vec::new();
        for entry in std::fs::read_dir(&self.base_path)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(ticker) = name.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }
        tickers.sort();
        Ok(tickers)
    }

    fn read_bars(&self, ticker: &str) -> Result<Vec<PriceBar>, String> {
        if !is_safe_ticker(ticker) {
            return Err(format!("'{}' is not a valid ticker file name", ticker));
        }
        let path = self.csv_path(ticker);
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

        let headers = rdr
            .headers()
            .map_err(|e| format!("CSV header error: {}", e))?
            .clone();
        let columns = locate_columns(&headers)?;

        let mut bars = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| format!("CSV parse error: {}", e))?;
            let row = line + 2;

            let date_str = field(&record, columns.date, "date", row)?;
            let date = parse_date(date_str)
                .ok_or_else(|| format!("row {}: invalid date '{}'", row, date_str))?;

            let bar = PriceBar {
                date,
                open: parse_price(&record, columns.open, "open", row)?,
                high: parse_price(&record, columns.high, "high", row)?,
                low: parse_price(&record, columns.low, "low", row)?,
                close: parse_price(&record, columns.close, "close", row)?,
            };

            if !bar.has_positive_prices() {
                return Err(format!("row {}: prices must be positive", row));
            }
            if !bar.is_consistent() {
                warn!(%ticker, %date, "bar violates low <= open/close <= high");
            }
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        if let Some(w) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(format!("duplicate date {}", w[0].date));
        }
        Ok(bars)
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch(&self, ticker: &str, period: Period) -> Result<Vec<PriceBar>, GoldenCrossError> {
        let bars = self
            .read_bars(ticker)
            .map_err(|reason| GoldenCrossError::DataUnavailable {
                ticker: ticker.to_string(),
                reason,
            })?;

        let Some(last) = bars.last().map(|b| b.date) else {
            return Err(GoldenCrossError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: "no rows".to_string(),
            });
        };

        Ok(match period.start_date(last) {
            Some(start) => bars.into_iter().filter(|b| b.date >= start).collect(),
            None => bars,
        })
    }
}

fn locate_columns(headers: &csv::StringRecord) -> Result<Columns, String> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("missing {} column", name))
    };
    Ok(Columns {
        date: find("date")?,
        open: find("open")?,
        high: find("high")?,
        low: find("low")?,
        close: find("close")?,
    })
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<&'r str, String> {
    record
        .get(index)
        .ok_or_else(|| format!("row {}: missing {} value", row, name))
}

fn parse_price(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<f64, String> {
    let raw = field(record, index, name, row)?;
    raw.parse()
        .map_err(|e| format!("row {}: invalid {} value '{}': {}", row, name, raw, e))
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part as written by
/// some exporters (`2024-01-15 00:00:00-05:00`).
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}
