//! Per-instrument position state machine.
//!
//! Two states, FLAT and LONG. For one instrument on one day the machine looks
//! at the current [`Position`] and the closing-price history up to and
//! including that day, and answers with a single [`Signal`]:
//!
//! LONG exits, first match wins:
//! 1. take profit: move >= take_profit_pct
//! 2. stop loss: move <= -stop_loss_pct
//! 3. max holding: day - buy_day >= max_holding_days
//! 4. RSI overbought (if enabled): RSI >= rsi_overbought
//!
//! FLAT entries, first match wins:
//! 1. SMA crossover (if both periods > 0): prev_short <= prev_long and
//!    short > long
//! 2. RSI oversold (if enabled): RSI <= rsi_oversold
//!
//! Evaluation is pure; the engine applies the resulting trade to the ledger.

use super::indicator::{rsi, sma};
use super::position::{Position, TradeReason};
use super::strategy::StrategyParameters;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    Hold,
    Enter(TradeReason),
    Exit(TradeReason),
}

/// Decide today's action. `history` holds the closes from day 0 through
/// today, so `history.len() - 1` is today's day index and nothing after it is
/// visible.
pub fn evaluate(
    position: &Position,
    history: &[f64],
    params: &StrategyParameters,
    rsi_period: usize,
) -> Signal {
    if history.is_empty() {
        return Signal::Hold;
    }

    let reason = if position.is_open() {
        check_exit(position, history, params, rsi_period).map(Signal::Exit)
    } else {
        check_entry(history, params, rsi_period).map(Signal::Enter)
    };
    reason.unwrap_or(Signal::Hold)
}

pub fn check_exit(
    position: &Position,
    history: &[f64],
    params: &StrategyParameters,
    rsi_period: usize,
) -> Option<TradeReason> {
    let day = history.len().checked_sub(1)?;
    let close = history[day];
    let profit_pct = position.profit_pct(close);

    if profit_pct >= params.take_profit_pct {
        return Some(TradeReason::TakeProfit {
            gain_pct: profit_pct,
        });
    }
    if profit_pct <= -params.stop_loss_pct {
        return Some(TradeReason::StopLoss {
            loss_pct: profit_pct,
        });
    }

    let holding_days = position.holding_days(day);
    if holding_days >= params.max_holding_days {
        return Some(TradeReason::MaxHoldingPeriod { days: holding_days });
    }

    if params.rsi_overbought_enabled() {
        let value = rsi(history, day, rsi_period);
        if value >= params.rsi_overbought {
            return Some(TradeReason::RsiOverbought { rsi: value });
        }
    }

    None
}

pub fn check_entry(
    history: &[f64],
    params: &StrategyParameters,
    rsi_period: usize,
) -> Option<TradeReason> {
    let day = history.len().checked_sub(1)?;

    if params.sma_crossover_enabled() {
        if let Some((short, long)) = sma_cross_up(history, day, params) {
            return Some(TradeReason::SmaCrossover { short, long });
        }
    }

    if params.rsi_oversold_enabled() {
        let value = rsi(history, day, rsi_period);
        if value <= params.rsi_oversold {
            return Some(TradeReason::RsiOversold { rsi: value });
        }
    }

    None
}

/// Today's (short, long) SMA pair when the short average crossed above the
/// long one since yesterday. Any undefined average means no cross.
fn sma_cross_up(history: &[f64], day: usize, params: &StrategyParameters) -> Option<(f64, f64)> {
    let prev = day.checked_sub(1)?;
    let short = sma(history, day, params.sma_short_period)?;
    let long = sma(history, day, params.sma_long_period)?;
    let prev_short = sma(history, prev, params.sma_short_period)?;
    let prev_long = sma(history, prev, params.sma_long_period)?;

    (prev_short <= prev_long && short > long).then_some((short, long))
}

/// Whole shares buyable with `fraction` of `cash` at `price`.
pub fn position_size(cash: f64, price: f64, fraction: f64) -> u64 {
    if !(price.is_finite() && price > 0.0) || cash <= 0.0 {
        return 0;
    }
    (cash * fraction / price).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::PresetId;

    fn params() -> StrategyParameters {
        StrategyParameters {
            name: "Test".into(),
            rsi_oversold: 0.0,
            rsi_overbought: 100.0,
            sma_short_period: 0,
            sma_long_period: 0,
            stop_loss_pct: 5.0,
            take_profit_pct: 10.0,
            max_holding_days: 15,
        }
    }

    fn flat(n: usize, price: f64) -> Vec<f64> {
        vec![price; n]
    }

    #[test]
    fn empty_history_holds() {
        assert_eq!(evaluate(&Position::default(), &[], &params(), 14), Signal::Hold);
    }

    #[test]
    fn take_profit_fires_first() {
        let pos = Position::open(10, 100.0, 20);
        let mut history = flat(22, 100.0);
        history[21] = 111.0;
        let signal = evaluate(&pos, &history, &params(), 14);
        match signal {
            Signal::Exit(TradeReason::TakeProfit { gain_pct }) => {
                assert!((gain_pct - 11.0).abs() < 1e-9)
            }
            other => panic!("expected take profit, got {:?}", other),
        }
    }

    #[test]
    fn take_profit_beats_max_holding() {
        let pos = Position::open(10, 100.0, 0);
        let mut history = flat(30, 100.0);
        history[29] = 120.0;
        assert!(matches!(
            evaluate(&pos, &history, &params(), 14),
            Signal::Exit(TradeReason::TakeProfit { .. })
        ));
    }

    #[test]
    fn take_profit_at_exact_threshold() {
        let pos = Position::open(10, 100.0, 20);
        let mut history = flat(22, 100.0);
        history[21] = 110.0;
        assert!(matches!(
            evaluate(&pos, &history, &params(), 14),
            Signal::Exit(TradeReason::TakeProfit { .. })
        ));
    }

    #[test]
    fn stop_loss_fires() {
        let pos = Position::open(10, 100.0, 20);
        let mut history = flat(22, 100.0);
        history[21] = 94.0;
        match evaluate(&pos, &history, &params(), 14) {
            Signal::Exit(TradeReason::StopLoss { loss_pct }) => {
                assert!((loss_pct + 6.0).abs() < 1e-9)
            }
            other => panic!("expected stop loss, got {:?}", other),
        }
    }

    #[test]
    fn stop_loss_beats_max_holding() {
        let pos = Position::open(10, 100.0, 0);
        let mut history = flat(30, 100.0);
        history[29] = 50.0;
        assert!(matches!(
            evaluate(&pos, &history, &params(), 14),
            Signal::Exit(TradeReason::StopLoss { .. })
        ));
    }

    #[test]
    fn max_holding_period_fires() {
        let pos = Position::open(10, 100.0, 20);
        let history = flat(36, 101.0);
        assert_eq!(
            evaluate(&pos, &history, &params(), 14),
            Signal::Exit(TradeReason::MaxHoldingPeriod { days: 15 })
        );
        let history = flat(35, 101.0);
        assert_eq!(evaluate(&pos, &history, &params(), 14), Signal::Hold);
    }

    #[test]
    fn max_holding_beats_rsi_overbought() {
        let pos = Position::open(10, 100.0, 20);
        let history: Vec<f64> = (0..36).map(|i| 100.0 + i as f64 * 0.01).collect();
        let p = StrategyParameters {
            rsi_overbought: 70.0,
            take_profit_pct: 50.0,
            ..params()
        };
        assert!(matches!(
            evaluate(&pos, &history, &p, 14),
            Signal::Exit(TradeReason::MaxHoldingPeriod { .. })
        ));
    }

    #[test]
    fn rsi_overbought_fires_when_enabled() {
        let pos = Position::open(10, 100.0, 20);
        // small steady gains: RSI 100, move below take profit
        let history: Vec<f64> = (0..25).map(|i| 99.0 + i as f64 * 0.01).collect();
        let p = StrategyParameters {
            rsi_overbought: 70.0,
            ..params()
        };
        match evaluate(&pos, &history, &p, 14) {
            Signal::Exit(TradeReason::RsiOverbought { rsi }) => assert_eq!(rsi, 100.0),
            other => panic!("expected RSI overbought, got {:?}", other),
        }
        assert_eq!(evaluate(&pos, &history, &params(), 14), Signal::Hold);
    }

    #[test]
    fn sma_crossover_entry() {
        // long flat stretch, then a jump: the 2-day average crosses the 4-day one
        let mut history = flat(21, 100.0);
        history[20] = 104.0;
        let p = StrategyParameters {
            sma_short_period: 2,
            sma_long_period: 4,
            ..params()
        };
        match evaluate(&Position::default(), &history, &p, 14) {
            Signal::Enter(TradeReason::SmaCrossover { short, long }) => {
                assert!((short - 102.0).abs() < 1e-9);
                assert!((long - 101.0).abs() < 1e-9);
            }
            other => panic!("expected crossover, got {:?}", other),
        }
    }

    #[test]
    fn sma_already_above_is_not_a_cross() {
        let history: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let p = StrategyParameters {
            sma_short_period: 2,
            sma_long_period: 4,
            ..params()
        };
        assert_eq!(evaluate(&Position::default(), &history, &p, 14), Signal::Hold);
    }

    #[test]
    fn sma_undefined_window_never_crosses() {
        let mut history = flat(21, 100.0);
        history[20] = 104.0;
        let p = StrategyParameters {
            sma_short_period: 2,
            sma_long_period: 30,
            ..params()
        };
        assert_eq!(evaluate(&Position::default(), &history, &p, 14), Signal::Hold);
    }

    #[test]
    fn sma_cross_takes_precedence_over_rsi() {
        let mut history: Vec<f64> = (0..21).map(|i| 200.0 - i as f64).collect();
        history[20] = 195.0;
        let p = StrategyParameters {
            sma_short_period: 2,
            sma_long_period: 4,
            rsi_oversold: 30.0,
            ..params()
        };
        assert!(matches!(
            evaluate(&Position::default(), &history, &p, 14),
            Signal::Enter(TradeReason::SmaCrossover { .. })
        ));
    }

    #[test]
    fn rsi_oversold_entry() {
        let history: Vec<f64> = (0..25).map(|i| 200.0 - i as f64).collect();
        let p = StrategyParameters {
            rsi_oversold: 30.0,
            ..params()
        };
        match evaluate(&Position::default(), &history, &p, 14) {
            Signal::Enter(TradeReason::RsiOversold { rsi }) => assert!(rsi.abs() < 1e-9),
            other => panic!("expected RSI oversold, got {:?}", other),
        }
    }

    #[test]
    fn flat_prices_never_enter() {
        let history = flat(60, 42.0);
        for preset in PresetId::all() {
            for day in 20..60 {
                let signal = evaluate(&Position::default(), &history[..=day], &preset.parameters(), 14);
                assert_eq!(signal, Signal::Hold, "{} day {}", preset, day);
            }
        }
    }

    #[test]
    fn degenerate_strategy_never_enters() {
        let history: Vec<f64> = (0..40).map(|i| 200.0 - i as f64).collect();
        assert_eq!(
            evaluate(&Position::default(), &history, &params(), 14),
            Signal::Hold
        );
    }

    #[test]
    fn position_size_floors_fraction_of_cash() {
        assert_eq!(position_size(100_000.0, 100.0, 0.2), 200);
        assert_eq!(position_size(100_000.0, 333.0, 0.2), 60);
        assert_eq!(position_size(400.0, 100.0, 0.2), 0);
        assert_eq!(position_size(0.0, 100.0, 0.2), 0);
        assert_eq!(position_size(1000.0, 0.0, 0.2), 0);
    }
}
