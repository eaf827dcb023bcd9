//! Per-instrument positions and the trade records they produce.

use chrono::NaiveDate;
use std::fmt;

/// Holding state for one instrument. Flat positions are `Position::default()`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub quantity: u64,
    pub avg_buy_price: f64,
    pub buy_day: Option<usize>,
}

impl Position {
    pub fn open(quantity: u64, price: f64, day: usize) -> Self {
        Position {
            quantity,
            avg_buy_price: price,
            buy_day: Some(day),
        }
    }

    pub fn is_open(&self) -> bool {
        self.quantity > 0
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.avg_buy_price) * self.quantity as f64
    }

    /// Percentage move of `price` against the entry price.
    pub fn profit_pct(&self, price: f64) -> f64 {
        (price - self.avg_buy_price) / self.avg_buy_price * 100.0
    }

    pub fn holding_days(&self, day: usize) -> usize {
        self.buy_day.map_or(0, |buy| day.saturating_sub(buy))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => f.write_str("BUY"),
            TradeSide::Sell => f.write_str("SELL"),
        }
    }
}

/// Why a trade happened, with the indicator reading or move that caused it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TradeReason {
    SmaCrossover { short: f64, long: f64 },
    RsiOversold { rsi: f64 },
    TakeProfit { gain_pct: f64 },
    StopLoss { loss_pct: f64 },
    MaxHoldingPeriod { days: usize },
    RsiOverbought { rsi: f64 },
}

impl TradeReason {
    pub fn is_entry(&self) -> bool {
        matches!(
            self,
            TradeReason::SmaCrossover { .. } | TradeReason::RsiOversold { .. }
        )
    }
}

impl fmt::Display for TradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeReason::SmaCrossover { short, long } => {
                write!(f, "SMA Crossover (Short:{:.2} > Long:{:.2})", short, long)
            }
            TradeReason::RsiOversold { rsi } => write!(f, "RSI Oversold (RSI: {:.2})", rsi),
            TradeReason::TakeProfit { gain_pct } => {
                write!(f, "Take Profit ({:.2}% gain)", gain_pct)
            }
            TradeReason::StopLoss { loss_pct } => write!(f, "Stop Loss ({:.2}% loss)", loss_pct),
            TradeReason::MaxHoldingPeriod { days } => {
                write!(f, "Max Holding Period ({} days)", days)
            }
            TradeReason::RsiOverbought { rsi } => write!(f, "RSI Overbought (RSI: {:.2})", rsi),
        }
    }
}

/// One executed BUY or SELL. Never modified after it is appended to the log.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub symbol: String,
    pub date: NaiveDate,
    pub day_index: usize,
    pub side: TradeSide,
    pub price: f64,
    pub quantity: u64,
    pub total_value: f64,
    pub cash_before: f64,
    pub cash_after: f64,
    pub realized_profit_loss: f64,
    pub reason: TradeReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_position_is_flat() {
        let pos = Position::default();
        assert!(!pos.is_open());
        assert_eq!(pos.buy_day, None);
        assert_eq!(pos.quantity, 0);
    }

    #[test]
    fn open_position_fields() {
        let pos = Position::open(200, 100.0, 21);
        assert!(pos.is_open());
        assert_eq!(pos.buy_day, Some(21));
        assert!((pos.avg_buy_price - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn market_value_and_unrealized() {
        let pos = Position::open(100, 50.0, 20);
        assert!((pos.market_value(55.0) - 5500.0).abs() < f64::EPSILON);
        assert!((pos.unrealized_pnl(55.0) - 500.0).abs() < f64::EPSILON);
        assert!((pos.unrealized_pnl(45.0) + 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn profit_pct_relative_to_entry() {
        let pos = Position::open(10, 100.0, 20);
        assert!((pos.profit_pct(111.0) - 11.0).abs() < 1e-9);
        assert!((pos.profit_pct(95.0) + 5.0).abs() < 1e-9);
    }

    #[test]
    fn holding_days_counts_from_buy_day() {
        let pos = Position::open(10, 100.0, 20);
        assert_eq!(pos.holding_days(20), 0);
        assert_eq!(pos.holding_days(35), 15);
        assert_eq!(Position::default().holding_days(35), 0);
    }

    #[test]
    fn reason_text() {
        assert_eq!(
            TradeReason::TakeProfit { gain_pct: 11.0 }.to_string(),
            "Take Profit (11.00% gain)"
        );
        assert_eq!(
            TradeReason::StopLoss { loss_pct: -5.5 }.to_string(),
            "Stop Loss (-5.50% loss)"
        );
        assert_eq!(
            TradeReason::MaxHoldingPeriod { days: 15 }.to_string(),
            "Max Holding Period (15 days)"
        );
        assert_eq!(
            TradeReason::SmaCrossover { short: 101.5, long: 100.25 }.to_string(),
            "SMA Crossover (Short:101.50 > Long:100.25)"
        );
    }

    #[test]
    fn entry_reasons() {
        assert!(TradeReason::RsiOversold { rsi: 25.0 }.is_entry());
        assert!(TradeReason::SmaCrossover { short: 1.0, long: 0.5 }.is_entry());
        assert!(!TradeReason::RsiOverbought { rsi: 75.0 }.is_entry());
        assert!(!TradeReason::TakeProfit { gain_pct: 10.0 }.is_entry());
    }

    #[test]
    fn side_text() {
        assert_eq!(TradeSide::Buy.to_string(), "BUY");
        assert_eq!(TradeSide::Sell.to_string(), "SELL");
    }
}
