//! Instrument universe: symbol lists and loading validated instruments.

use log::info;
use std::collections::HashSet;

use crate::domain::error::StratbenchError;
use crate::domain::ohlcv::Instrument;
use crate::ports::data_port::PriceDataPort;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Split a comma-separated symbol list, trimming and upper-casing each entry.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Load `symbols` (or every symbol the port lists, when `None`) as
/// instruments, preserving order.
///
/// Fails before any simulation when the universe is empty, a symbol has no
/// history, a symbol repeats, or a history lists the same date twice.
pub fn load_instruments(
    data_port: &dyn PriceDataPort,
    symbols: Option<&[String]>,
) -> Result<Vec<Instrument>, StratbenchError> {
    let symbols = match symbols {
        Some(s) => s.to_vec(),
        None => data_port.list_symbols()?,
    };
    if symbols.is_empty() {
        return Err(StratbenchError::EmptyUniverse);
    }

    let mut seen = HashSet::new();
    let mut instruments = Vec::with_capacity(symbols.len());

    for symbol in symbols {
        if !seen.insert(symbol.clone()) {
            return Err(StratbenchError::DuplicateSymbol { symbol });
        }
        let prices = data_port.fetch_prices(&symbol)?;
        let count = prices.len();
        let instrument = Instrument::new(symbol.clone(), prices)
            .ok_or_else(|| StratbenchError::NoData {
                symbol: symbol.clone(),
            })?;
        if let Some(date) = instrument.repeated_date() {
            return Err(StratbenchError::Data {
                reason: format!("{} has more than one price for {}", symbol, date),
            });
        }
        info!("  {}: {} days", symbol, count);
        instruments.push(instrument);
    }

    Ok(instruments)
}
