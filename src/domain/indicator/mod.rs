//! Technical indicator implementations.
//!
//! Indicators return one `Option<f64>` per input bar; `None` marks the warmup
//! bars where the full lookback window does not exist yet.

pub mod sma;

pub use sma::calculate_sma;
