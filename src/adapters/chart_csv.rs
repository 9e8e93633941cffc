//! Annotated series export for charting.

use crate::domain::annotate::AnnotatedSeries;
use crate::domain::error::GoldenCrossError;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(rename = "shortMA")]
    short_ma: Option<f64>,
    #[serde(rename = "longMA")]
    long_ma: Option<f64>,
    signal: bool,
}

/// Undefined averages are written as empty cells.
pub fn write_chart<W: Write>(writer: W, series: &AnnotatedSeries) -> Result<(), GoldenCrossError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for ab in &series.bars {
        wtr.serialize(ChartRow {
            date: ab.bar.date,
            open: ab.bar.open,
            high: ab.bar.high,
            low: ab.bar.low,
            close: ab.bar.close,
            short_ma: ab.short_ma,
            long_ma: ab.long_ma,
            signal: ab.signal,
        })?;
    }
    wtr.flush().map_err(|e| GoldenCrossError::Export {
        reason: e.to_string(),
    })?;
    Ok(())
}

pub fn write_chart_file(path: &Path, series: &AnnotatedSeries) -> Result<(), GoldenCrossError> {
    let file = std::fs::File::create(path)?;
    write_chart(file, series)
}
