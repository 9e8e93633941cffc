//! Report output port trait.

use crate::domain::backtest::BatchResult;
use crate::domain::error::GoldenCrossError;
use std::path::Path;

/// Port for persisting the outcome of a batch.
pub trait ReportPort {
    fn write(&self, result: &BatchResult, output_path: &Path) -> Result<(), GoldenCrossError>;
}
