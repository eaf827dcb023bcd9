//! Technical indicators evaluated over a closing-price prefix.
//!
//! Every function takes the full close slice plus the day it is evaluated
//! "as of" and only reads `closes[..=as_of_day]`, so the engine can call it for
//! any simulated day without look-ahead. Nothing is cached; each call
//! recomputes its window from scratch.

pub mod rsi;
pub mod sma;

pub use rsi::{NEUTRAL_RSI, rsi};
pub use sma::sma;

use std::fmt;

/// Indicator identity plus parameters, used when describing signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}
