//! Trade list export and import.
//!
//! One row per [`Trade`], columns in camelCase as declared on the type.

use crate::domain::backtest::BatchResult;
use crate::domain::error::GoldenCrossError;
use crate::domain::position::Trade;
use crate::ports::report_port::ReportPort;
use std::io::{Read, Write};
use std::path::Path;

pub fn write_trades<W: Write>(writer: W, trades: &[Trade]) -> Result<(), GoldenCrossError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for trade in trades {
        wtr.serialize(trade)?;
    }
    wtr.flush().map_err(|e| GoldenCrossError::Export {
        reason: e.to_string(),
    })?;
    Ok(())
}

pub fn read_trades<R: Read>(reader: R) -> Result<Vec<Trade>, GoldenCrossError> {
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.deserialize()
        .map(|row| row.map_err(GoldenCrossError::from))
        .collect()
}

pub fn write_trades_file(path: &Path, trades: &[Trade]) -> Result<(), GoldenCrossError> {
    let file = std::fs::File::create(path)?;
    write_trades(file, trades)
}

pub fn read_trades_file(path: &Path) -> Result<Vec<Trade>, GoldenCrossError> {
    let file = std::fs::File::open(path)?;
    read_trades(file)
}

/// Writes every trade of a batch to a CSV file.
pub struct CsvTradeReport;

impl ReportPort for CsvTradeReport {
    fn write(&self, result: &BatchResult, output_path: &Path) -> Result<(), GoldenCrossError> {
        write_trades_file(output_path, &result.trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::ExitReason;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_trade() -> Trade {
        Trade {
            ticker: "MSFT".into(),
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            entry_price: 100.0,
            entry_open: 99.5,
            entry_high: 101.0,
            entry_low: 98.75,
            exit_date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            exit_price: 115.5,
            exit_open: 112.0,
            exit_high: 116.0,
            exit_low: 111.25,
            holding_days: 10,
            return_pct: 15.5,
            exit_reason: ExitReason::TakeProfit,
        }
    }

    #[test]
    fn header_uses_camel_case_columns() {
        let mut buf = Vec::new();
        write_trades(&mut buf, &[sample_trade()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "ticker,entryDate,entryPrice,entryOpen,entryHigh,entryLow,exitDate,exitPrice,\
             exitOpen,exitHigh,exitLow,holdingDays,returnPct,exitReason"
        );
        assert!(text.contains("MSFT,2024-01-02,100.0"));
        assert!(text.trim_end().ends_with("TakeProfit"));
    }

    #[test]
    fn empty_trade_list_writes_nothing() {
        let mut buf = Vec::new();
        write_trades(&mut buf, &[]).unwrap();
        assert!(read_trades(buf.as_slice()).unwrap().is_empty());
    }

    #[test]
    fn read_rejects_unknown_exit_reason() {
        let text = "ticker,entryDate,entryPrice,entryOpen,entryHigh,entryLow,exitDate,exitPrice,\
                    exitOpen,exitHigh,exitLow,holdingDays,returnPct,exitReason\n\
                    MSFT,2024-01-02,1,1,1,1,2024-01-03,1,1,1,1,1,0,Margin\n";
        assert!(matches!(
            read_trades(text.as_bytes()),
            Err(GoldenCrossError::Export { .. })
        ));
    }

    #[test]
    fn report_port_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        let trade = sample_trade();
        let result = BatchResult {
            trades: vec![trade.clone()],
            summary: crate::domain::metrics::summarize(std::slice::from_ref(&trade)),
            analyzed: vec![],
            skipped: vec![],
            failed_tickers: vec![],
            cancelled: vec![],
        };

        CsvTradeReport.write(&result, &path).unwrap();

        assert_eq!(read_trades_file(&path).unwrap(), vec![trade]);
    }

    #[test]
    fn write_to_missing_directory_is_io_error() {
        let err = write_trades_file(Path::new("/nonexistent/dir/trades.csv"), &[]).unwrap_err();
        assert!(matches!(err, GoldenCrossError::Io(_)));
    }
}
