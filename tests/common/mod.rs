#![allow(dead_code)]

use chrono::NaiveDate;
use stratbench::domain::error::StratbenchError;
use stratbench::domain::ohlcv::Instrument;
pub use stratbench::domain::ohlcv::PricePoint;
use stratbench::domain::strategy::StrategyParameters;
use stratbench::ports::data_port::PriceDataPort;
use std::collections::HashMap;

pub struct MockPriceDataPort {
    pub order: Vec<String>,
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceDataPort {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, symbol: &str, prices: Vec<PricePoint>) -> Self {
        if !self.order.iter().any(|s| s == symbol) {
            self.order.push(symbol.to_string());
        }
        self.data.insert(symbol.to_string(), prices);
        self
    }

    pub fn with_closes(self, symbol: &str, closes: &[f64]) -> Self {
        self.with_prices(symbol, points(closes))
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        if !self.order.iter().any(|s| s == symbol) {
            self.order.push(symbol.to_string());
        }
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockPriceDataPort {
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, StratbenchError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StratbenchError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, StratbenchError> {
        Ok(self.order.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Flat bars (open = high = low = close) on consecutive days from 2024-01-01.
pub fn points(closes: &[f64]) -> Vec<PricePoint> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100_000,
        })
        .collect()
}

pub fn instrument(symbol: &str, closes: &[f64]) -> Instrument {
    Instrument::new(symbol, points(closes)).unwrap()
}

/// Closes falling by 1.0 a day from 120.0, reaching 100.0 on day 20.
pub fn falling_into_day_20() -> Vec<f64> {
    (0..21).map(|i| 120.0 - i as f64).collect()
}

pub fn falling_then(after: &[f64]) -> Vec<f64> {
    let mut closes = falling_into_day_20();
    closes.extend_from_slice(after);
    closes
}

/// A smooth oscillation with a slow drift, enough to trigger both rule families.
pub fn wave(len: usize, base: f64, amplitude: f64, phase: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            base + amplitude * (t * 0.4 + phase).sin() + 0.05 * t
        })
        .collect()
}

pub fn rsi_only(take_profit: f64) -> StrategyParameters {
    StrategyParameters {
        name: "RSI Only".into(),
        rsi_oversold: 30.0,
        rsi_overbought: 100.0,
        sma_short_period: 0,
        sma_long_period: 0,
        stop_loss_pct: 50.0,
        take_profit_pct: take_profit,
        max_holding_days: 100,
    }
}

pub fn never_trades() -> StrategyParameters {
    StrategyParameters {
        name: "Idle".into(),
        rsi_oversold: 0.0,
        rsi_overbought: 100.0,
        sma_short_period: 0,
        sma_long_period: 0,
        stop_loss_pct: 5.0,
        take_profit_pct: 10.0,
        max_holding_days: 10,
    }
}
