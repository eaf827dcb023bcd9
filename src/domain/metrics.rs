//! Performance summaries of completed runs.

use super::ohlcv::Instrument;
use super::portfolio::{EquityPoint, Portfolio};
use super::position::{Trade, TradeSide};

/// Headline numbers for one completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyResult {
    pub strategy_name: String,
    pub owner_id: String,
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return: f64,
    /// Percent, e.g. 5.0 for +5%.
    pub return_pct: f64,
    /// BUY and SELL trades together.
    pub trade_count: usize,
    pub win_count: usize,
    pub loss_count: usize,
    /// Fraction of closed trades with positive P/L, in [0, 1].
    pub win_rate: f64,
    pub total_realized_profit: f64,
}

/// Summarize a finished portfolio. Open positions are valued at each
/// instrument's final close. A closed trade with exactly zero P/L counts as a
/// loss.
pub fn summarize(
    portfolio: &Portfolio,
    instruments: &[Instrument],
    initial_cash: f64,
    strategy_name: &str,
    owner_id: &str,
) -> StrategyResult {
    let final_value = portfolio.mark_to_market(instruments, usize::MAX);

    let mut win_count = 0usize;
    let mut loss_count = 0usize;
    let mut total_realized_profit = 0.0_f64;

    for trade in sells(portfolio.trades()) {
        total_realized_profit += trade.realized_profit_loss;
        if trade.realized_profit_loss > 0.0 {
            win_count += 1;
        } else {
            loss_count += 1;
        }
    }

    let closed = win_count + loss_count;
    let win_rate = if closed > 0 {
        win_count as f64 / closed as f64
    } else {
        0.0
    };

    let total_return = final_value - initial_cash;
    let return_pct = if initial_cash > 0.0 {
        total_return / initial_cash * 100.0
    } else {
        0.0
    };

    StrategyResult {
        strategy_name: strategy_name.to_string(),
        owner_id: owner_id.to_string(),
        initial_capital: initial_cash,
        final_value,
        total_return,
        return_pct,
        trade_count: portfolio.trades().len(),
        win_count,
        loss_count,
        win_rate,
        total_realized_profit,
    }
}

/// Stable sort by `return_pct`, best first. Equal returns keep their input
/// order.
pub fn rank(results: &[StrategyResult]) -> Vec<StrategyResult> {
    let mut ranked = results.to_vec();
    ranked.sort_by(|a, b| b.return_pct.total_cmp(&a.return_pct));
    ranked
}

/// Index of the first result with the highest `return_pct`.
pub fn best_performer(results: &[StrategyResult]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, r) in results.iter().enumerate() {
        match best {
            Some(b) if results[b].return_pct >= r.return_pct => {}
            _ => best = Some(i),
        }
    }
    best
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPositionSummary {
    pub symbol: String,
    pub quantity: u64,
    pub avg_buy_price: f64,
    pub current_price: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pct: f64,
}

/// Trade statistics and holdings for the detailed single-run report.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub buy_count: usize,
    pub sell_count: usize,
    pub total_invested: f64,
    pub total_realized_profit: f64,
    pub avg_profit_per_trade: f64,
    pub final_cash: f64,
    pub final_value: f64,
    pub max_drawdown: f64,
    pub open_positions: Vec<OpenPositionSummary>,
}

impl RunReport {
    pub fn compute(portfolio: &Portfolio, instruments: &[Instrument]) -> Self {
        let trades = portfolio.trades();
        let buy_count = trades.iter().filter(|t| t.side == TradeSide::Buy).count();
        let sell_count = trades.len() - buy_count;
        let total_invested: f64 = trades
            .iter()
            .filter(|t| t.side == TradeSide::Buy)
            .map(|t| t.total_value)
            .sum();
        let total_realized_profit: f64 = sells(trades).map(|t| t.realized_profit_loss).sum();
        let avg_profit_per_trade = if sell_count > 0 {
            total_realized_profit / sell_count as f64
        } else {
            0.0
        };

        // instrument order, not symbol order, to match the input universe
        let open_positions = instruments
            .iter()
            .filter_map(|inst| {
                let pos = portfolio.position(&inst.symbol);
                if !pos.is_open() {
                    return None;
                }
                let current_price = inst.last_close();
                let unrealized_pnl = pos.unrealized_pnl(current_price);
                let cost = pos.avg_buy_price * pos.quantity as f64;
                Some(OpenPositionSummary {
                    symbol: inst.symbol.clone(),
                    quantity: pos.quantity,
                    avg_buy_price: pos.avg_buy_price,
                    current_price,
                    market_value: pos.market_value(current_price),
                    unrealized_pnl,
                    unrealized_pct: if cost > 0.0 {
                        unrealized_pnl / cost * 100.0
                    } else {
                        0.0
                    },
                })
            })
            .collect();

        RunReport {
            buy_count,
            sell_count,
            total_invested,
            total_realized_profit,
            avg_profit_per_trade,
            final_cash: portfolio.cash,
            final_value: portfolio.mark_to_market(instruments, usize::MAX),
            max_drawdown: max_drawdown(&portfolio.equity_curve),
            open_positions,
        }
    }
}

fn sells(trades: &[Trade]) -> impl Iterator<Item = &Trade> {
    trades.iter().filter(|t| t.side == TradeSide::Sell)
}

/// Largest peak-to-trough decline as a fraction of the peak.
fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = match equity_curve.first() {
        Some(p) => p.equity,
        None => return 0.0,
    };
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
        }
    }
    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PricePoint;
    use crate::domain::position::TradeReason;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn instrument(symbol: &str, closes: &[f64]) -> Instrument {
        let prices = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: date(1 + i as u32),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect();
        Instrument::new(symbol, prices).unwrap()
    }

    fn round_trip(portfolio: &mut Portfolio, symbol: &str, buy: f64, sell: f64, qty: u64) {
        let reason = TradeReason::RsiOversold { rsi: 20.0 };
        portfolio
            .apply_buy(symbol, date(1), 0, buy, qty, reason)
            .unwrap();
        portfolio
            .apply_sell(symbol, date(2), 1, sell, TradeReason::MaxHoldingPeriod { days: 1 })
            .unwrap();
    }

    fn result(name: &str, return_pct: f64) -> StrategyResult {
        StrategyResult {
            strategy_name: name.into(),
            owner_id: "System".into(),
            initial_capital: 100.0,
            final_value: 100.0 + return_pct,
            total_return: return_pct,
            return_pct,
            trade_count: 0,
            win_count: 0,
            loss_count: 0,
            win_rate: 0.0,
            total_realized_profit: 0.0,
        }
    }

    #[test]
    fn summarize_empty_portfolio() {
        let portfolio = Portfolio::new(100_000.0);
        let r = summarize(&portfolio, &[], 100_000.0, "Idle", "alice");
        assert_eq!(r.strategy_name, "Idle");
        assert_eq!(r.owner_id, "alice");
        assert_eq!(r.trade_count, 0);
        assert_eq!(r.win_rate, 0.0);
        assert!((r.final_value - 100_000.0).abs() < f64::EPSILON);
        assert_eq!(r.return_pct, 0.0);
    }

    #[test]
    fn summarize_counts_wins_and_losses() {
        let mut portfolio = Portfolio::new(10_000.0);
        round_trip(&mut portfolio, "A", 100.0, 110.0, 10);
        round_trip(&mut portfolio, "B", 100.0, 90.0, 10);
        round_trip(&mut portfolio, "C", 100.0, 120.0, 10);

        let r = summarize(&portfolio, &[], 10_000.0, "Test", "System");
        assert_eq!(r.trade_count, 6);
        assert_eq!(r.win_count, 2);
        assert_eq!(r.loss_count, 1);
        assert!((r.win_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((r.total_realized_profit - 200.0).abs() < 1e-9);
        assert!((r.final_value - 10_200.0).abs() < 1e-9);
        assert!((r.return_pct - 2.0).abs() < 1e-9);
    }

    #[test]
    fn breakeven_trade_is_a_loss() {
        let mut portfolio = Portfolio::new(10_000.0);
        round_trip(&mut portfolio, "A", 100.0, 100.0, 10);
        let r = summarize(&portfolio, &[], 10_000.0, "Test", "System");
        assert_eq!(r.win_count, 0);
        assert_eq!(r.loss_count, 1);
        assert_eq!(r.win_rate, 0.0);
    }

    #[test]
    fn summarize_marks_open_positions_at_final_close() {
        let mut portfolio = Portfolio::new(10_000.0);
        portfolio
            .apply_buy("A", date(1), 0, 100.0, 10, TradeReason::RsiOversold { rsi: 20.0 })
            .unwrap();
        let instruments = vec![instrument("A", &[100.0, 130.0, 150.0])];

        let r = summarize(&portfolio, &instruments, 10_000.0, "Test", "System");
        assert!((r.final_value - 10_500.0).abs() < 1e-9);
        assert!((r.total_return - 500.0).abs() < 1e-9);
        assert!((r.return_pct - 5.0).abs() < 1e-9);
        assert_eq!(r.win_count + r.loss_count, 0);
    }

    #[test]
    fn rank_sorts_descending() {
        let results = vec![result("low", -2.0), result("high", 8.0), result("mid", 3.0)];
        let names: Vec<String> = rank(&results).into_iter().map(|r| r.strategy_name).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn rank_is_stable_on_ties() {
        let results = vec![
            result("first", 1.0),
            result("top", 5.0),
            result("second", 1.0),
            result("third", 1.0),
        ];
        let names: Vec<String> = rank(&results).into_iter().map(|r| r.strategy_name).collect();
        assert_eq!(names, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn best_performer_prefers_first_of_ties() {
        let results = vec![result("a", 1.0), result("b", 4.0), result("c", 4.0)];
        assert_eq!(best_performer(&results), Some(1));
        assert_eq!(best_performer(&[]), None);
    }

    #[test]
    fn run_report_statistics() {
        let mut portfolio = Portfolio::new(10_000.0);
        round_trip(&mut portfolio, "A", 100.0, 110.0, 10);
        round_trip(&mut portfolio, "B", 50.0, 40.0, 10);
        portfolio
            .apply_buy("C", date(3), 2, 20.0, 5, TradeReason::RsiOversold { rsi: 10.0 })
            .unwrap();
        let instruments = vec![
            instrument("A", &[100.0]),
            instrument("B", &[50.0]),
            instrument("C", &[20.0, 25.0]),
        ];

        let report = RunReport::compute(&portfolio, &instruments);
        assert_eq!(report.buy_count, 3);
        assert_eq!(report.sell_count, 2);
        assert!((report.total_invested - 1600.0).abs() < 1e-9);
        assert!((report.total_realized_profit - 0.0).abs() < 1e-9);
        assert!((report.avg_profit_per_trade - 0.0).abs() < 1e-9);
        assert!((report.final_cash - 9900.0).abs() < 1e-9);
        assert!((report.final_value - 10_025.0).abs() < 1e-9);

        assert_eq!(report.open_positions.len(), 1);
        let open = &report.open_positions[0];
        assert_eq!(open.symbol, "C");
        assert!((open.unrealized_pnl - 25.0).abs() < 1e-9);
        assert!((open.unrealized_pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn max_drawdown_from_equity_curve() {
        let curve: Vec<EquityPoint> = [100.0, 110.0, 90.0, 95.0, 80.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, &equity)| EquityPoint {
                date: date(1 + i as u32),
                day_index: i,
                equity,
            })
            .collect();
        assert!((max_drawdown(&curve) - 30.0 / 110.0).abs() < 1e-12);
        assert_eq!(max_drawdown(&[]), 0.0);
    }
}
