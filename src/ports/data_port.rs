//! Price data access port trait.

use crate::domain::error::StratbenchError;
use crate::domain::ohlcv::PricePoint;

pub trait PriceDataPort {
    /// Daily history for `symbol`, oldest first. An unknown symbol yields an
    /// empty vector.
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, StratbenchError>;

    /// Every symbol the source knows, in the order it first appears.
    fn list_symbols(&self) -> Result<Vec<String>, StratbenchError>;
}
