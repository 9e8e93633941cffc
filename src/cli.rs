//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::adapters::chart_csv::write_chart_file;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::trade_csv_adapter::CsvTradeReport;
use crate::domain::backtest::{BatchResult, BatchRunner};
use crate::domain::config_validation::{
    build_parameters_with_preset, resolve_period, validate_backtest_config,
    validate_strategy_config,
};
use crate::domain::error::GoldenCrossError;
use crate::domain::position::ExitReason;
use crate::domain::strategy::{OverlapPolicy, Preset, StrategyParameters};
use crate::domain::universe::{limit_tickers, parse_tickers, DEFAULT_MAX_TICKERS};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::Period;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_OUTPUT: &str = "trades.csv";

#[derive(Parser, Debug)]
#[command(name = "goldencross", about = "Golden cross moving-average backtester")]
pub struct Cli {
    /// Diagnostic log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a list of tickers
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma separated tickers, replacing [backtest] tickers
        #[arg(long)]
        tickers: Option<String>,
        #[arg(long)]
        preset: Option<Preset>,
        #[arg(long)]
        period: Option<Period>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Run tickers one after another instead of on the thread pool
        #[arg(long)]
        sequential: bool,
    },
    /// Write the annotated price series of one ticker
    Chart {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the built-in strategy presets
    Presets,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct BacktestOverrides {
    pub tickers: Option<String>,
    pub period: Option<Period>,
    pub data_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub sequential: bool,
}

/// Everything a backtest run needs besides the strategy parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSettings {
    pub tickers: Vec<String>,
    /// Tickers cut by `max_tickers`.
    pub dropped: Vec<String>,
    pub period: Period,
    pub data_dir: PathBuf,
    pub output: PathBuf,
    pub parallel: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.log_level);

    match cli.command {
        Command::Backtest {
            config,
            tickers,
            preset,
            period,
            data_dir,
            output,
            sequential,
        } => {
            let overrides = BacktestOverrides {
                tickers,
                period,
                data_dir,
                output,
                sequential,
            };
            run_backtest(&config, preset, &overrides)
        }
        Command::Chart {
            config,
            ticker,
            output,
        } => run_chart(&config, &ticker, output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::Presets => run_presets(),
    }
}

fn init_logging(level: Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: a log subscriber is already installed");
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: GoldenCrossError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn resolve_tickers(
    ticker_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, GoldenCrossError> {
    let raw = match ticker_override {
        Some(t) => t.to_string(),
        None => config
            .get_string("backtest", "tickers")
            .ok_or_else(|| GoldenCrossError::ConfigMissing {
                section: "backtest".into(),
                key: "tickers".into(),
            })?,
    };
    Ok(parse_tickers(&raw)?)
}

pub fn build_backtest_settings(
    config: &dyn ConfigPort,
    overrides: &BacktestOverrides,
) -> Result<BacktestSettings, GoldenCrossError> {
    let tickers = resolve_tickers(overrides.tickers.as_deref(), config)?;

    let max = config.get_int("backtest", "max_tickers", DEFAULT_MAX_TICKERS as i64);
    let max = usize::try_from(max)
        .ok()
        .filter(|m| *m >= 1)
        .ok_or_else(|| GoldenCrossError::ConfigInvalid {
            section: "backtest".into(),
            key: "max_tickers".into(),
            reason: "max_tickers must be at least 1".into(),
        })?;
    let (tickers, dropped) = limit_tickers(tickers, max);

    let period = match overrides.period {
        Some(p) => p,
        None => resolve_period(config)?,
    };

    let data_dir = overrides.data_dir.clone().unwrap_or_else(|| {
        config
            .get_string("data", "dir")
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    });

    let output = overrides.output.clone().unwrap_or_else(|| {
        config
            .get_string("report", "output")
            .filter(|o| !o.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    });

    Ok(BacktestSettings {
        tickers,
        dropped,
        period,
        data_dir,
        output,
        parallel: !overrides.sequential && config.get_bool("backtest", "parallel", true),
    })
}

fn run_backtest(
    config_path: &Path,
    preset: Option<Preset>,
    overrides: &BacktestOverrides,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if overrides.tickers.is_none() {
        if let Err(e) = validate_backtest_config(&adapter) {
            return fail(e);
        }
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(e);
    }

    // Stage 2: Resolve parameters and settings
    let params = match build_parameters_with_preset(&adapter, preset) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    let settings = match build_backtest_settings(&adapter, overrides) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    if !settings.dropped.is_empty() {
        eprintln!(
            "warning: ticker limit reached, ignoring {}",
            settings.dropped.join(", ")
        );
    }

    eprintln!(
        "Running {} on {} ({}, data from {})",
        params.label(),
        settings.tickers.join(", "),
        settings.period,
        settings.data_dir.display(),
    );

    // Stage 3: Run the batch
    let data_port = CsvAdapter::new(settings.data_dir.clone());
    let runner = BatchRunner::new(&data_port).with_parallelism(settings.parallel);
    let result = match runner.run(&settings.tickers, params, settings.period) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    // Stage 4: Print console summary to stderr
    print_summary(&result, &params);

    if result.analyzed.is_empty() {
        eprintln!("error: no ticker could be analysed");
        return ExitCode::from(5);
    }

    // Stage 5: Export trades
    match CsvTradeReport.write(&result, &settings.output) {
        Ok(()) => {
            eprintln!("\nTrades written to: {}", settings.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn print_summary(result: &BatchResult, params: &StrategyParameters) {
    let s = &result.summary;

    for skipped in &result.skipped {
        eprintln!(
            "warning: skipped {} ({} bars, need {})",
            skipped.ticker, skipped.bars, skipped.minimum
        );
    }
    for failed in &result.failed_tickers {
        eprintln!("warning: failed {} ({})", failed.ticker, failed.reason);
    }

    eprintln!("\n=== Aggregate Results ===");
    eprintln!("Strategy:         {}", params.label());
    eprintln!("Tickers Traded:   {}", s.tickers_traded());
    eprintln!("Total Trades:     {}", s.total_trades);
    eprintln!("Winning Trades:   {}", s.winning_trades);
    eprintln!("Losing Trades:    {}", s.losing_trades);
    eprintln!("Win Rate:         {:.1}%", s.win_rate);
    eprintln!("Mean Return:      {:.2}%", s.mean_return);
    eprintln!("Std Dev:          {:.2}%", s.std_dev_return);
    eprintln!("Sharpe Ratio:     {:.2}", s.sharpe_ratio);
    eprintln!("Avg Win:          {:.2}%", s.avg_win);
    eprintln!("Avg Loss:         {:.2}%", s.avg_loss);
    eprintln!("Avg Holding:      {:.1} days", s.mean_holding_days);

    if s.total_trades > 0 {
        eprintln!("\n=== Exit Reasons ===");
        for reason in ExitReason::ALL {
            let count = s.exit_reasons.get(reason);
            eprintln!(
                "  {:<20} {:>5}  ({:.1}%)",
                reason.description(),
                count,
                count as f64 / s.total_trades as f64 * 100.0
            );
        }
    }

    if !s.per_ticker.is_empty() {
        eprintln!("\n=== Per-Ticker Summary ===");
        for t in &s.per_ticker {
            let sign = if t.mean_return >= 0.0 { "+" } else { "" };
            eprintln!(
                "  {}:  {} trades, {:.1}% win rate, {}{:.2}% mean, {:.1} days, entry {:.2}",
                t.ticker,
                t.trade_count,
                t.win_rate,
                sign,
                t.mean_return,
                t.mean_holding_days,
                t.mean_entry_price,
            );
        }
    }
}

fn run_chart(config_path: &Path, ticker: &str, output_path: Option<&PathBuf>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(e);
    }

    let ticker = match parse_tickers(ticker) {
        Ok(mut t) if t.len() == 1 => t.remove(0),
        Ok(_) => {
            eprintln!("error: chart takes exactly one ticker");
            return ExitCode::from(4);
        }
        Err(e) => return fail(e.into()),
    };
    let params = match build_parameters_with_preset(&adapter, None) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    let settings = match build_backtest_settings(
        &adapter,
        &BacktestOverrides {
            tickers: Some(ticker.clone()),
            ..Default::default()
        },
    ) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let data_port = CsvAdapter::new(settings.data_dir);
    let series = match BatchRunner::new(&data_port).annotated_series(&ticker, params, settings.period) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let output = output_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from(format!("{}_chart.csv", ticker)));
    match write_chart_file(&output, &series) {
        Ok(()) => {
            eprintln!(
                "{}: {} bars, {} signals, written to {}",
                ticker,
                series.len(),
                series.signal_count(),
                output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(e);
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(e);
    }
    let params = match build_parameters_with_preset(&adapter, None) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    let settings = match build_backtest_settings(&adapter, &BacktestOverrides::default()) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    eprintln!("\nStrategy:");
    print_parameters(&params);
    eprintln!("\nUniverse:");
    eprintln!("  tickers: {}", settings.tickers.join(", "));
    if !settings.dropped.is_empty() {
        eprintln!("  ignored: {}", settings.dropped.join(", "));
    }
    eprintln!("  period:  {}", settings.period);
    eprintln!("  data:    {}", settings.data_dir.display());
    eprintln!("  output:  {}", settings.output.display());

    match CsvAdapter::new(settings.data_dir.clone()).list_tickers() {
        Ok(available) => {
            for ticker in settings.tickers.iter().filter(|t| !available.contains(t)) {
                eprintln!("warning: no data file for {}", ticker);
            }
        }
        Err(e) => eprintln!("warning: cannot read data directory: {e}"),
    }

    if params.has_inverted_windows() {
        eprintln!("\nwarning: short_window is not shorter than long_window");
    }
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn print_parameters(params: &StrategyParameters) {
    eprintln!("  short_window:     {}", params.short_window);
    eprintln!("  long_window:      {}", params.long_window);
    eprintln!("  max_holding_days: {}", params.max_holding_days);
    eprintln!("  stop_loss:        {}%", params.stop_loss_pct);
    eprintln!("  take_profit:      {}%", params.take_profit_pct);
    eprintln!(
        "  allow_overlap:    {}",
        params.overlap == OverlapPolicy::Independent
    );
}

fn run_presets() -> ExitCode {
    for preset in Preset::ALL {
        let p = preset.parameters();
        println!(
            "{:<14} {:<10} hold {:>3}d  stop {:>4}%  target {:>4}%",
            preset.name(),
            p.label(),
            p.max_holding_days,
            p.stop_loss_pct,
            p.take_profit_pct,
        );
    }
    ExitCode::SUCCESS
}
