//! Strategy parameters and built-in presets.

use crate::domain::error::GoldenCrossError;
use std::fmt;
use std::str::FromStr;

/// How a new signal is treated while an earlier trade on the same ticker is
/// still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Every signal is simulated on its own.
    #[default]
    Independent,
    /// Signals dated before the previous trade's exit are ignored.
    SuppressWhileOpen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParameters {
    pub short_window: usize,
    pub long_window: usize,
    pub max_holding_days: u32,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub overlap: OverlapPolicy,
}

impl Default for StrategyParameters {
    fn default() -> Self {
        Preset::Classic.parameters()
    }
}

impl StrategyParameters {
    pub fn validate(&self) -> Result<(), GoldenCrossError> {
        if self.short_window == 0 {
            return Err(invalid("short_window", "must be a positive integer"));
        }
        if self.long_window == 0 {
            return Err(invalid("long_window", "must be a positive integer"));
        }
        if self.max_holding_days == 0 {
            return Err(invalid("max_holding_days", "must be a positive integer"));
        }
        if !(self.stop_loss_pct.is_finite() && self.stop_loss_pct > 0.0) {
            return Err(invalid("stop_loss_pct", "must be a positive percentage"));
        }
        if !(self.take_profit_pct.is_finite() && self.take_profit_pct > 0.0) {
            return Err(invalid("take_profit_pct", "must be a positive percentage"));
        }
        Ok(())
    }

    /// Short window at or beyond the long window: allowed, but the crossover
    /// loses its usual meaning.
    pub fn has_inverted_windows(&self) -> bool {
        self.short_window >= self.long_window
    }

    /// e.g. "MA50/200"
    pub fn label(&self) -> String {
        format!("MA{}/{}", self.short_window, self.long_window)
    }
}

fn invalid(field: &str, reason: &str) -> GoldenCrossError {
    GoldenCrossError::InvalidParameters {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Classic,
    ShortTerm,
    Conservative,
    Aggressive,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Classic,
        Preset::ShortTerm,
        Preset::Conservative,
        Preset::Aggressive,
    ];

    pub fn parameters(self) -> StrategyParameters {
        let (short_window, long_window, max_holding_days, stop_loss_pct, take_profit_pct) =
            match self {
                Preset::Classic => (50, 200, 60, 10.0, 15.0),
                Preset::ShortTerm => (20, 50, 30, 5.0, 8.0),
                Preset::Conservative => (100, 200, 90, 8.0, 12.0),
                Preset::Aggressive => (10, 30, 20, 15.0, 25.0),
            };
        StrategyParameters {
            short_window,
            long_window,
            max_holding_days,
            stop_loss_pct,
            take_profit_pct,
            overlap: OverlapPolicy::Independent,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::ShortTerm => "short-term",
            Preset::Conservative => "conservative",
            Preset::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = GoldenCrossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "classic" | "golden-cross" => Ok(Preset::Classic),
            "short-term" | "shortterm" => Ok(Preset::ShortTerm),
            "conservative" => Ok(Preset::Conservative),
            "aggressive" => Ok(Preset::Aggressive),
            other => Err(invalid("preset", &format!("unknown preset '{other}'"))),
        }
    }
}
