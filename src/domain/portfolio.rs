//! Portfolio ledger: cash, open positions and the append-only trade log.
//!
//! [`Portfolio::apply_buy`] and [`Portfolio::apply_sell`] are the only
//! mutators of cash, positions and the trade log. Every successful call
//! appends exactly one [`Trade`]; cash never goes negative.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::error::LedgerError;
use super::ohlcv::Instrument;
use super::position::{Position, Trade, TradeReason, TradeSide};

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub day_index: usize,
    pub equity: f64,
}

/// Result of a buy attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        quantity: u64,
        price: f64,
        total_value: f64,
    },
    /// Zero quantity, or the order costs more than the available cash. No
    /// trade is recorded.
    InsufficientCapital,
}

/// Result of closing a position.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub quantity: u64,
    pub price: f64,
    pub total_value: f64,
    pub realized_profit_loss: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    positions: BTreeMap<String, Position>,
    trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            positions: BTreeMap::new(),
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    /// Current position for `symbol`; flat if it was never opened.
    pub fn position(&self, symbol: &str) -> Position {
        self.positions.get(symbol).copied().unwrap_or_default()
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.position(symbol).is_open()
    }

    /// Open positions in symbol order.
    pub fn open_positions(&self) -> impl Iterator<Item = (&str, &Position)> {
        self.positions
            .iter()
            .filter(|(_, pos)| pos.is_open())
            .map(|(symbol, pos)| (symbol.as_str(), pos))
    }

    pub fn position_count(&self) -> usize {
        self.open_positions().count()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Buy `quantity` shares of `symbol` at `price`.
    ///
    /// Unaffordable or zero-sized orders are skipped and reported as
    /// [`EntryResult::InsufficientCapital`]. Buying into an open position is a
    /// caller bug and returns [`LedgerError::PositionAlreadyOpen`].
    pub fn apply_buy(
        &mut self,
        symbol: &str,
        date: NaiveDate,
        day: usize,
        price: f64,
        quantity: u64,
        reason: TradeReason,
    ) -> Result<EntryResult, LedgerError> {
        check_price(symbol, price)?;
        if self.has_position(symbol) {
            return Err(LedgerError::PositionAlreadyOpen {
                symbol: symbol.to_string(),
            });
        }

        let total_value = price * quantity as f64;
        if quantity == 0 || total_value > self.cash {
            return Ok(EntryResult::InsufficientCapital);
        }

        let cash_before = self.cash;
        self.cash -= total_value;

        self.trades.push(Trade {
            symbol: symbol.to_string(),
            date,
            day_index: day,
            side: TradeSide::Buy,
            price,
            quantity,
            total_value,
            cash_before,
            cash_after: self.cash,
            realized_profit_loss: 0.0,
            reason,
        });
        self.positions
            .insert(symbol.to_string(), Position::open(quantity, price, day));

        Ok(EntryResult::Entered {
            quantity,
            price,
            total_value,
        })
    }

    /// Close the whole open position in `symbol` at `price`.
    pub fn apply_sell(
        &mut self,
        symbol: &str,
        date: NaiveDate,
        day: usize,
        price: f64,
        reason: TradeReason,
    ) -> Result<ExitResult, LedgerError> {
        check_price(symbol, price)?;
        let position = match self.positions.get(symbol) {
            Some(pos) if pos.is_open() => *pos,
            _ => {
                return Err(LedgerError::NoOpenPosition {
                    symbol: symbol.to_string(),
                });
            }
        };

        let quantity = position.quantity;
        let total_value = price * quantity as f64;
        let realized_profit_loss = (price - position.avg_buy_price) * quantity as f64;

        let cash_before = self.cash;
        self.cash += total_value;

        self.trades.push(Trade {
            symbol: symbol.to_string(),
            date,
            day_index: day,
            side: TradeSide::Sell,
            price,
            quantity,
            total_value,
            cash_before,
            cash_after: self.cash,
            realized_profit_loss,
            reason,
        });
        self.positions.remove(symbol);

        Ok(ExitResult {
            quantity,
            price,
            total_value,
            realized_profit_loss,
        })
    }

    /// Cash plus every open position valued at its instrument's close on
    /// `day` (or the last available close if the history is shorter).
    ///
    /// A position whose instrument is not in `instruments` is carried at cost.
    pub fn mark_to_market(&self, instruments: &[Instrument], day: usize) -> f64 {
        let position_value: f64 = self
            .open_positions()
            .map(|(symbol, pos)| {
                let price = instruments
                    .iter()
                    .find(|inst| inst.symbol == symbol)
                    .map(|inst| inst.close_as_of(day))
                    .unwrap_or(pos.avg_buy_price);
                pos.market_value(price)
            })
            .sum();
        self.cash + position_value
    }

    pub fn record_equity(&mut self, date: NaiveDate, day_index: usize, equity: f64) {
        self.equity_curve.push(EquityPoint {
            date,
            day_index,
            equity,
        });
    }
}

fn check_price(symbol: &str, price: f64) -> Result<(), LedgerError> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::InvalidPrice {
            symbol: symbol.to_string(),
            price,
        })
    }
}
