//! Core domain types and logic.

pub mod ohlcv;
pub mod series;
pub mod indicator;
pub mod annotate;
pub mod signal;
pub mod strategy;
pub mod position;
pub mod execution;
pub mod metrics;
pub mod backtest;
pub mod universe;
pub mod config_validation;
pub mod error;
