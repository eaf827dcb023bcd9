//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvPriceAdapter, write_prices};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sample_data;
use crate::adapters::text_report_adapter::{
    TextReportAdapter, render_comparison, render_run_report,
};
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::comparison::{compare_strategies, standard_runs};
use crate::domain::config_validation::{validate_backtest_config, validate_strategy_config};
use crate::domain::error::StratbenchError;
use crate::domain::metrics::{RunReport, summarize};
use crate::domain::ohlcv::Instrument;
use crate::domain::strategy::{PresetId, StrategyChoice, StrategyParameters};
use crate::domain::universe::{load_instruments, parse_symbols};
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "stratbench", about = "Trading strategy backtester and comparison tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one strategy and print its detailed report
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Strategy file; defaults to the [strategy] section of the config
        #[arg(short, long)]
        strategy: Option<PathBuf>,
        /// Use a built-in preset instead of a strategy file
        #[arg(short, long, conflicts_with = "strategy")]
        preset: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the presets plus custom strategies side by side
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        /// Custom strategy file (repeatable)
        #[arg(short, long)]
        strategy: Vec<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a strategy configuration
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// List the built-in preset strategies
    Presets,
    /// Write a synthetic price file to experiment with
    Sample {
        #[arg(short, long, default_value = "stock_data.csv")]
        output: PathBuf,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = sample_data::DEFAULT_DAYS)]
        days: usize,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            strategy,
            preset,
            output,
        } => run_backtest(
            &config,
            strategy.as_deref(),
            preset.as_deref(),
            output.as_deref(),
        ),
        Command::Compare {
            config,
            strategy,
            output,
        } => run_compare(&config, &strategy, output.as_deref()),
        Command::Validate { strategy } => run_validate(&strategy),
        Command::Presets => run_presets(),
        Command::Sample { output, seed, days } => run_sample(&output, seed, days),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StratbenchError> {
    FileConfigAdapter::from_file(path).map_err(|e| StratbenchError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn config_usize(
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<usize, StratbenchError> {
    let value = adapter.get_int(section, key, default);
    usize::try_from(value).map_err(|_| StratbenchError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: format!("{} must be a non-negative integer", value),
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, StratbenchError> {
    let defaults = BacktestConfig::default();
    Ok(BacktestConfig {
        initial_capital: adapter.get_double("backtest", "initial_capital", defaults.initial_capital),
        position_fraction: adapter.get_double(
            "backtest",
            "position_fraction",
            defaults.position_fraction,
        ),
        rsi_period: config_usize(adapter, "backtest", "rsi_period", defaults.rsi_period as i64)?,
        warmup_days: config_usize(adapter, "backtest", "warmup_days", defaults.warmup_days as i64)?,
    })
}

/// A `preset` key selects a built-in strategy; otherwise the explicit
/// parameters form a custom one.
pub fn build_strategy_choice(adapter: &dyn ConfigPort) -> Result<StrategyChoice, StratbenchError> {
    if let Some(preset) = adapter
        .get_string("strategy", "preset")
        .filter(|s| !s.trim().is_empty())
    {
        return Ok(StrategyChoice::UsePreset(preset.parse()?));
    }

    Ok(StrategyChoice::Custom(StrategyParameters {
        name: adapter
            .get_string("strategy", "name")
            .unwrap_or_else(|| "Custom Strategy".to_string()),
        rsi_oversold: adapter.get_double("strategy", "rsi_oversold", 0.0),
        rsi_overbought: adapter.get_double("strategy", "rsi_overbought", 100.0),
        sma_short_period: config_usize(adapter, "strategy", "sma_short", 0)?,
        sma_long_period: config_usize(adapter, "strategy", "sma_long", 0)?,
        stop_loss_pct: adapter.get_double("strategy", "stop_loss", 0.0),
        take_profit_pct: adapter.get_double("strategy", "take_profit", 0.0),
        max_holding_days: config_usize(adapter, "strategy", "max_holding_days", 0)?,
    }))
}

/// `None` means every symbol in the data file.
pub fn resolve_symbols(adapter: &dyn ConfigPort) -> Result<Option<Vec<String>>, StratbenchError> {
    match adapter
        .get_string("backtest", "symbols")
        .filter(|s| !s.trim().is_empty())
    {
        Some(list) => parse_symbols(&list)
            .map(Some)
            .map_err(|e| StratbenchError::ConfigInvalid {
                section: "backtest".into(),
                key: "symbols".into(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Relative `data_file` paths are taken relative to the config file.
pub fn resolve_data_path(config_path: &Path, data_file: &str) -> PathBuf {
    let data_path = PathBuf::from(data_file);
    if data_path.is_absolute() {
        return data_path;
    }
    match config_path.parent() {
        Some(dir) => dir.join(data_path),
        None => data_path,
    }
}

/// Load and validate a strategy file.
pub fn load_strategy(path: &Path) -> Result<StrategyChoice, StratbenchError> {
    info!("Loading strategy from {}", path.display());
    let adapter = load_config(path)?;
    validate_strategy_config(&adapter)?;
    build_strategy_choice(&adapter)
}

struct Session {
    adapter: FileConfigAdapter,
    bt_config: BacktestConfig,
    instruments: Vec<Instrument>,
}

fn open_session(config_path: &Path) -> Result<Session, StratbenchError> {
    info!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;
    let bt_config = build_backtest_config(&adapter)?;

    let data_file = adapter
        .get_string("backtest", "data_file")
        .ok_or_else(|| StratbenchError::ConfigMissing {
            section: "backtest".into(),
            key: "data_file".into(),
        })?;
    let data_path = resolve_data_path(config_path, &data_file);
    let data_port = CsvPriceAdapter::from_file(&data_path)?;

    let symbols = resolve_symbols(&adapter)?;
    info!("Loading instruments...");
    let instruments = load_instruments(&data_port, symbols.as_deref())?;

    Ok(Session {
        adapter,
        bt_config,
        instruments,
    })
}

fn owner(adapter: &dyn ConfigPort) -> String {
    adapter
        .get_string("backtest", "owner")
        .unwrap_or_else(|| "user".to_string())
}

fn run_backtest(
    config_path: &Path,
    strategy_path: Option<&Path>,
    preset: Option<&str>,
    output_path: Option<&Path>,
) -> Result<(), StratbenchError> {
    let session = open_session(config_path)?;

    let choice = match (preset, strategy_path) {
        (Some(name), _) => StrategyChoice::UsePreset(name.parse::<PresetId>()?),
        (None, Some(path)) => load_strategy(path)?,
        (None, None) => {
            validate_strategy_config(&session.adapter)?;
            build_strategy_choice(&session.adapter)?
        }
    };
    let params = choice.resolve();
    if params.is_degenerate() {
        warn!("{} has no enabled entry rule and will never trade", params.name);
    }

    info!(
        "Running backtest: {} ({} instruments)",
        params.name,
        session.instruments.len()
    );
    let result = backtest_engine::run_backtest(&session.instruments, &params, &session.bt_config)?;

    let summary = summarize(
        &result.portfolio,
        &session.instruments,
        session.bt_config.initial_capital,
        &params.name,
        &owner(&session.adapter),
    );
    let report = RunReport::compute(&result.portfolio, &session.instruments);
    let reporter = TextReportAdapter {
        show_trades: session.adapter.get_bool("report", "show_trades", true),
    };

    match output_path {
        Some(path) => {
            reporter.write_run(&result, &summary, &report, &path.to_string_lossy())?;
            info!("Report written to: {}", path.display());
        }
        None => print!(
            "{}",
            render_run_report(&result, &summary, &report, reporter.show_trades)
        ),
    }
    Ok(())
}

fn run_compare(
    config_path: &Path,
    strategy_paths: &[PathBuf],
    output_path: Option<&Path>,
) -> Result<(), StratbenchError> {
    let session = open_session(config_path)?;

    let custom = strategy_paths
        .iter()
        .map(|path| load_strategy(path).map(|choice| choice.resolve()))
        .collect::<Result<Vec<_>, _>>()?;
    let runs = standard_runs(&custom, &owner(&session.adapter));

    info!(
        "Comparing {} strategies on {} instruments",
        runs.len(),
        session.instruments.len()
    );
    let results = compare_strategies(&session.instruments, &runs, &session.bt_config)?;

    match output_path {
        Some(path) => {
            TextReportAdapter::default().write_comparison(&results, &path.to_string_lossy())?;
            info!("Report written to: {}", path.display());
        }
        None => print!("{}", render_comparison(&results)),
    }
    Ok(())
}

fn run_validate(strategy_path: &Path) -> Result<(), StratbenchError> {
    let params = load_strategy(strategy_path)?.resolve();

    let indicators: Vec<String> = params
        .indicators(BacktestConfig::default().rsi_period)
        .iter()
        .map(|i| i.to_string())
        .collect();

    println!("Strategy: {}", params.name);
    println!("  {}", params);
    if !indicators.is_empty() {
        println!("  Indicators: {}", indicators.join(", "));
    }
    if params.is_degenerate() {
        warn!("no entry rule is enabled; this strategy will never trade");
    }
    println!("\nStrategy configuration is valid.");
    Ok(())
}

fn run_presets() -> Result<(), StratbenchError> {
    for id in PresetId::all() {
        let params = id.parameters();
        println!("{:<14} {}", id.key(), params.name);
        println!("{:<14} {}", "", params);
    }
    Ok(())
}

fn run_sample(output: &Path, seed: u64, days: usize) -> Result<(), StratbenchError> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or_else(|| StratbenchError::Data {
        reason: "invalid sample start date".into(),
    })?;
    let series = sample_data::generate(seed, start, days);
    let file = File::create(output)?;
    write_prices(BufWriter::new(file), &series)?;
    info!(
        "Wrote {} days for {} symbols to {}",
        days,
        series.len(),
        output.display()
    );
    Ok(())
}
