//! Configuration validation.
//!
//! Validates all config fields before a backtest runs.

use crate::domain::error::StratbenchError;
use crate::domain::strategy::PresetId;
use crate::domain::universe::parse_symbols;
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    validate_data_file(config)?;
    validate_symbols(config)?;
    validate_initial_capital(config)?;
    validate_position_fraction(config)?;
    validate_rsi_period(config)?;
    validate_warmup(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    if let Some(preset) = non_empty(config.get_string("strategy", "preset")) {
        preset.parse::<PresetId>()?;
        return Ok(());
    }

    validate_rsi_thresholds(config)?;
    validate_sma_periods(config)?;
    validate_exit_rules(config)?;
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn invalid(section: &str, key: &str, reason: &str) -> StratbenchError {
    StratbenchError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn missing(section: &str, key: &str) -> StratbenchError {
    StratbenchError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn validate_data_file(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    match non_empty(config.get_string("backtest", "data_file")) {
        Some(_) => Ok(()),
        None => Err(missing("backtest", "data_file")),
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    if let Some(symbols) = config.get_string("backtest", "symbols") {
        parse_symbols(&symbols).map_err(|e| invalid("backtest", "symbols", &e.to_string()))?;
    }
    Ok(())
}

/// Value of `key` parsed as `T`, or `None` when the key is absent or blank.
/// A value that is present but does not parse is an error rather than a
/// silent fallback to the default.
fn parsed<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, StratbenchError> {
    match non_empty(config.get_string(section, key)) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            invalid(section, key, &format!("{} is not a number: {:?}", key, raw.trim()))
        }),
        None => Ok(None),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    let value = parsed(config, "backtest", "initial_capital")?.unwrap_or(100_000.0_f64);
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_position_fraction(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    let value = parsed(config, "backtest", "position_fraction")?.unwrap_or(0.2_f64);
    if !(value > 0.0 && value <= 1.0) {
        return Err(invalid(
            "backtest",
            "position_fraction",
            "position_fraction must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_rsi_period(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    if parsed(config, "backtest", "rsi_period")?.unwrap_or(14_i64) < 1 {
        return Err(invalid(
            "backtest",
            "rsi_period",
            "rsi_period must be at least 1",
        ));
    }
    Ok(())
}

fn validate_warmup(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    if parsed(config, "backtest", "warmup_days")?.unwrap_or(20_i64) < 1 {
        return Err(invalid(
            "backtest",
            "warmup_days",
            "warmup_days must be at least 1",
        ));
    }
    Ok(())
}

fn validate_rsi_thresholds(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    let oversold = parsed(config, "strategy", "rsi_oversold")?.unwrap_or(0.0_f64);
    let overbought = parsed(config, "strategy", "rsi_overbought")?.unwrap_or(100.0_f64);

    if !(0.0..=100.0).contains(&oversold) {
        return Err(invalid(
            "strategy",
            "rsi_oversold",
            "rsi_oversold must be between 0 and 100",
        ));
    }
    if !(0.0..=100.0).contains(&overbought) {
        return Err(invalid(
            "strategy",
            "rsi_overbought",
            "rsi_overbought must be between 0 and 100",
        ));
    }
    if oversold > 0.0 && overbought < 100.0 && oversold >= overbought {
        return Err(invalid(
            "strategy",
            "rsi_oversold",
            "rsi_oversold must be below rsi_overbought",
        ));
    }
    Ok(())
}

fn validate_sma_periods(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    let short = parsed(config, "strategy", "sma_short")?.unwrap_or(0_i64);
    let long = parsed(config, "strategy", "sma_long")?.unwrap_or(0_i64);

    if short < 0 {
        return Err(invalid("strategy", "sma_short", "sma_short must be non-negative"));
    }
    if long < 0 {
        return Err(invalid("strategy", "sma_long", "sma_long must be non-negative"));
    }
    if short > 0 && long > 0 && short >= long {
        return Err(invalid(
            "strategy",
            "sma_short",
            "sma_short must be less than sma_long",
        ));
    }
    Ok(())
}

fn validate_exit_rules(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    for key in ["stop_loss", "take_profit"] {
        let value: f64 =
            parsed(config, "strategy", key)?.ok_or_else(|| missing("strategy", key))?;
        if value.is_nan() || value < 0.0 {
            return Err(invalid(
                "strategy",
                key,
                &format!("{} must be non-negative", key),
            ));
        }
    }
    let max_hold: i64 = parsed(config, "strategy", "max_holding_days")?
        .ok_or_else(|| missing("strategy", "max_holding_days"))?;
    if max_hold < 0 {
        return Err(invalid(
            "strategy",
            "max_holding_days",
            "max_holding_days must be a non-negative integer",
        ));
    }
    Ok(())
}
