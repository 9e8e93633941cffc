//! Configuration validation.
//!
//! Validates config fields before any data is fetched, and resolves the
//! strategy section into [`StrategyParameters`].

use crate::domain::error::GoldenCrossError;
use crate::domain::strategy::{OverlapPolicy, Preset, StrategyParameters};
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::Period;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    validate_tickers(config)?;
    validate_max_tickers(config)?;
    validate_period(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    validate_preset(config)?;
    validate_positive_int(config, "short_window")?;
    validate_positive_int(config, "long_window")?;
    validate_positive_int(config, "max_holding_days")?;
    validate_positive_pct(config, "stop_loss")?;
    validate_positive_pct(config, "take_profit")?;
    Ok(())
}

/// Preset first (classic when absent), then any explicit key on top.
pub fn build_parameters(config: &dyn ConfigPort) -> Result<StrategyParameters, GoldenCrossError> {
    build_parameters_with_preset(config, None)
}

/// As [`build_parameters`], with `preset` taking the place of `[strategy] preset`.
pub fn build_parameters_with_preset(
    config: &dyn ConfigPort,
    preset: Option<Preset>,
) -> Result<StrategyParameters, GoldenCrossError> {
    let preset = match (preset, config.get_string("strategy", "preset")) {
        (Some(p), _) => p,
        (None, Some(name)) if !name.trim().is_empty() => {
            name.parse::<Preset>().map_err(|_| invalid("strategy", "preset", "unknown preset"))?
        }
        _ => Preset::Classic,
    };
    let base = preset.parameters();

    let short_window = config.get_int("strategy", "short_window", base.short_window as i64);
    let long_window = config.get_int("strategy", "long_window", base.long_window as i64);
    let max_holding_days =
        config.get_int("strategy", "max_holding_days", i64::from(base.max_holding_days));

    let params = StrategyParameters {
        short_window: to_positive(short_window, "short_window")?,
        long_window: to_positive(long_window, "long_window")?,
        max_holding_days: u32::try_from(max_holding_days)
            .map_err(|_| invalid("strategy", "max_holding_days", "out of range"))?,
        stop_loss_pct: config.get_double("strategy", "stop_loss", base.stop_loss_pct),
        take_profit_pct: config.get_double("strategy", "take_profit", base.take_profit_pct),
        overlap: if config.get_bool("strategy", "allow_overlap", true) {
            OverlapPolicy::Independent
        } else {
            OverlapPolicy::SuppressWhileOpen
        },
    };
    params.validate()?;
    Ok(params)
}

/// `[data] period`, defaulting to five years.
pub fn resolve_period(config: &dyn ConfigPort) -> Result<Period, GoldenCrossError> {
    match config.get_string("data", "period") {
        Some(p) if !p.trim().is_empty() => p
            .parse()
            .map_err(|_| invalid("data", "period", "expected 6mo, 1y, 2y, 5y or max")),
        _ => Ok(Period::default()),
    }
}

fn to_positive(value: i64, key: &str) -> Result<usize, GoldenCrossError> {
    usize::try_from(value).map_err(|_| invalid("strategy", key, "must be a positive integer"))
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    match config.get_string("backtest", "tickers") {
        Some(s) if !s.trim().is_empty() => parse_tickers(&s)
            .map(|_| ())
            .map_err(|e| invalid("backtest", "tickers", &e.to_string())),
        _ => Err(GoldenCrossError::ConfigMissing {
            section: "backtest".to_string(),
            key: "tickers".to_string(),
        }),
    }
}

fn validate_max_tickers(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    if !config.has_key("backtest", "max_tickers") {
        return Ok(());
    }
    if config.get_int("backtest", "max_tickers", 0) < 1 {
        return Err(invalid("backtest", "max_tickers", "max_tickers must be at least 1"));
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    resolve_period(config).map(|_| ())
}

fn validate_preset(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    match config.get_string("strategy", "preset") {
        Some(name) if !name.trim().is_empty() => name
            .parse::<Preset>()
            .map(|_| ())
            .map_err(|_| invalid("strategy", "preset", &format!("unknown preset '{}'", name.trim()))),
        _ => Ok(()),
    }
}

fn validate_positive_int(config: &dyn ConfigPort, key: &str) -> Result<(), GoldenCrossError> {
    if !config.has_key("strategy", key) {
        return Ok(());
    }
    if config.get_int("strategy", key, 0) < 1 {
        return Err(invalid("strategy", key, &format!("{key} must be a positive integer")));
    }
    Ok(())
}

fn validate_positive_pct(config: &dyn ConfigPort, key: &str) -> Result<(), GoldenCrossError> {
    if !config.has_key("strategy", key) {
        return Ok(());
    }
    let value = config.get_double("strategy", key, 0.0);
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid("strategy", key, &format!("{key} must be a positive percentage")));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> GoldenCrossError {
    GoldenCrossError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
