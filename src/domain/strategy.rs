//! Strategy parameters, presets and the custom-or-preset choice.

use crate::domain::error::StratbenchError;
use crate::domain::indicator::IndicatorType;
use std::fmt;
use std::str::FromStr;

/// A complete rule set for one simulation run.
///
/// A zero SMA period, an oversold threshold of 0 or an overbought threshold
/// of 100 switch that rule family off.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParameters {
    pub name: String,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub sma_short_period: usize,
    pub sma_long_period: usize,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub max_holding_days: usize,
}

impl StrategyParameters {
    pub fn sma_crossover_enabled(&self) -> bool {
        self.sma_short_period > 0 && self.sma_long_period > 0
    }

    pub fn rsi_oversold_enabled(&self) -> bool {
        self.rsi_oversold > 0.0
    }

    pub fn rsi_overbought_enabled(&self) -> bool {
        self.rsi_overbought < 100.0
    }

    /// Indicators the enabled rules read, given the engine's RSI period.
    pub fn indicators(&self, rsi_period: usize) -> Vec<IndicatorType> {
        let mut out = Vec::new();
        if self.sma_crossover_enabled() {
            out.push(IndicatorType::Sma(self.sma_short_period));
            out.push(IndicatorType::Sma(self.sma_long_period));
        }
        if self.rsi_oversold_enabled() || self.rsi_overbought_enabled() {
            out.push(IndicatorType::Rsi(rsi_period));
        }
        out
    }

    /// True when no entry rule can ever fire.
    pub fn is_degenerate(&self) -> bool {
        !self.sma_crossover_enabled() && !self.rsi_oversold_enabled()
    }
}

impl fmt::Display for StrategyParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RSI: {:.0}-{:.0} | SMA: {}/{} | Stop Loss: {:.1}% | Take Profit: {:.1}% | Max Days: {}",
            self.rsi_oversold,
            self.rsi_overbought,
            self.sma_short_period,
            self.sma_long_period,
            self.stop_loss_pct,
            self.take_profit_pct,
            self.max_holding_days
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetId {
    SmaCrossover,
    Rsi,
    Combined,
}

impl PresetId {
    pub fn all() -> [PresetId; 3] {
        [PresetId::SmaCrossover, PresetId::Rsi, PresetId::Combined]
    }

    pub fn key(&self) -> &'static str {
        match self {
            PresetId::SmaCrossover => "sma_crossover",
            PresetId::Rsi => "rsi",
            PresetId::Combined => "combined",
        }
    }

    pub fn parameters(&self) -> StrategyParameters {
        match self {
            PresetId::SmaCrossover => StrategyParameters {
                name: "SMA Crossover".into(),
                rsi_oversold: 0.0,
                rsi_overbought: 100.0,
                sma_short_period: 5,
                sma_long_period: 20,
                stop_loss_pct: 5.0,
                take_profit_pct: 10.0,
                max_holding_days: 15,
            },
            PresetId::Rsi => StrategyParameters {
                name: "RSI Strategy".into(),
                rsi_oversold: 30.0,
                rsi_overbought: 70.0,
                sma_short_period: 0,
                sma_long_period: 0,
                stop_loss_pct: 4.0,
                take_profit_pct: 8.0,
                max_holding_days: 10,
            },
            PresetId::Combined => StrategyParameters {
                name: "Combined Strategy".into(),
                rsi_oversold: 30.0,
                rsi_overbought: 70.0,
                sma_short_period: 5,
                sma_long_period: 20,
                stop_loss_pct: 5.0,
                take_profit_pct: 12.0,
                max_holding_days: 20,
            },
        }
    }
}

impl FromStr for PresetId {
    type Err = StratbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sma_crossover" | "sma" => Ok(PresetId::SmaCrossover),
            "rsi" => Ok(PresetId::Rsi),
            "combined" => Ok(PresetId::Combined),
            _ => Err(StratbenchError::UnknownPreset { name: s.to_string() }),
        }
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Either a user-defined rule set or a reference to a built-in preset.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyChoice {
    Custom(StrategyParameters),
    UsePreset(PresetId),
}

impl StrategyChoice {
    pub fn resolve(&self) -> StrategyParameters {
        match self {
            StrategyChoice::Custom(params) => params.clone(),
            StrategyChoice::UsePreset(id) => id.parameters(),
        }
    }
}
