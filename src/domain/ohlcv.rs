//! Daily price points and instruments.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// A symbol and its chronologically ordered daily history.
///
/// Read-only input to the engine. Construct through [`Instrument::new`] so the
/// history is guaranteed non-empty and sorted by date. Loaders reject
/// histories where [`Instrument::repeated_date`] is `Some`.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub symbol: String,
    prices: Vec<PricePoint>,
    closes: Vec<f64>,
}

impl Instrument {
    /// Returns `None` when `prices` is empty.
    pub fn new(symbol: impl Into<String>, mut prices: Vec<PricePoint>) -> Option<Self> {
        if prices.is_empty() {
            return None;
        }
        prices.sort_by_key(|p| p.date);
        let closes = prices.iter().map(|p| p.close).collect();
        Some(Self {
            symbol: symbol.into(),
            prices,
            closes,
        })
    }

    pub fn prices(&self) -> &[PricePoint] {
        &self.prices
    }

    /// Closing prices in day order; `closes()[..=day]` is the no-look-ahead
    /// window for `day`.
    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// First date that appears more than once in the history.
    pub fn repeated_date(&self) -> Option<NaiveDate> {
        self.prices
            .windows(2)
            .find(|w| w[0].date == w[1].date)
            .map(|w| w[0].date)
    }

    pub fn last_close(&self) -> f64 {
        self.closes.last().copied().unwrap_or(0.0)
    }

    /// Close at `day`, or the last available close when `day` runs past the
    /// end of the history.
    pub fn close_as_of(&self, day: usize) -> f64 {
        self.closes
            .get(day)
            .copied()
            .unwrap_or_else(|| self.last_close())
    }
}
