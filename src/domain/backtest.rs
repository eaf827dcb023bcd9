//! Backtest engine and event loop.
//!
//! Days are processed in increasing order from `warmup_days` up to the length
//! of the shortest history. Within a day instruments are processed in input
//! order, each seeing only its own closes up to that day. Cash is shared, so
//! an earlier instrument's BUY on a day shrinks what a later instrument can
//! spend on the same day.

use log::{debug, info, warn};
use std::collections::HashSet;

use super::error::StratbenchError;
use super::ohlcv::Instrument;
use super::portfolio::{EntryResult, Portfolio};
use super::signal::{self, Signal};
use super::strategy::StrategyParameters;

/// Run-level parameters that are not part of a strategy's rule set.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Share of current cash committed to each new position.
    pub position_fraction: f64,
    pub rsi_period: usize,
    /// Index of the first simulated day.
    pub warmup_days: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 100_000.0,
            position_fraction: 0.2,
            rsi_period: 14,
            warmup_days: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy: StrategyParameters,
    pub portfolio: Portfolio,
    /// Day indices that were simulated, `first_day..end_day`.
    pub first_day: usize,
    pub end_day: usize,
}

impl BacktestResult {
    pub fn days_simulated(&self) -> usize {
        self.end_day.saturating_sub(self.first_day)
    }
}

/// Reject inputs the engine must never run on.
pub fn validate_instruments(instruments: &[Instrument]) -> Result<(), StratbenchError> {
    if instruments.is_empty() {
        return Err(StratbenchError::EmptyUniverse);
    }

    let mut seen = HashSet::new();
    for inst in instruments {
        if inst.is_empty() {
            return Err(StratbenchError::EmptyHistory {
                symbol: inst.symbol.clone(),
            });
        }
        if !seen.insert(inst.symbol.as_str()) {
            return Err(StratbenchError::DuplicateSymbol {
                symbol: inst.symbol.clone(),
            });
        }
    }
    Ok(())
}

/// Simulate `params` over `instruments` with a fresh portfolio.
pub fn run_backtest(
    instruments: &[Instrument],
    params: &StrategyParameters,
    config: &BacktestConfig,
) -> Result<BacktestResult, StratbenchError> {
    validate_instruments(instruments)?;

    let end_day = instruments.iter().map(Instrument::len).min().unwrap_or(0);
    let first_day = config.warmup_days;
    if end_day <= first_day {
        warn!(
            "{}: shortest history has {} days, nothing to simulate after {} warm-up days",
            params.name, end_day, first_day
        );
    }

    info!(
        "Running {}: {} instruments, days {}..{}",
        params.name,
        instruments.len(),
        first_day,
        end_day
    );

    let mut portfolio = Portfolio::new(config.initial_capital);

    for day in first_day..end_day {
        for inst in instruments {
            step(&mut portfolio, inst, day, params, config)?;
        }

        let equity = portfolio.mark_to_market(instruments, day);
        let date = instruments[0].prices()[day].date;
        portfolio.record_equity(date, day, equity);
    }

    info!(
        "Finished {}: {} trades, cash {:.2}",
        params.name,
        portfolio.trades().len(),
        portfolio.cash
    );

    Ok(BacktestResult {
        strategy: params.clone(),
        portfolio,
        first_day,
        end_day: end_day.max(first_day),
    })
}

/// One decision for one instrument on one day.
fn step(
    portfolio: &mut Portfolio,
    inst: &Instrument,
    day: usize,
    params: &StrategyParameters,
    config: &BacktestConfig,
) -> Result<(), StratbenchError> {
    let history = &inst.closes()[..=day];
    let bar = &inst.prices()[day];
    let position = portfolio.position(&inst.symbol);

    match signal::evaluate(&position, history, params, config.rsi_period) {
        Signal::Hold => {}
        Signal::Enter(reason) => {
            let quantity =
                signal::position_size(portfolio.cash, bar.close, config.position_fraction);
            match portfolio.apply_buy(&inst.symbol, bar.date, day, bar.close, quantity, reason)? {
                EntryResult::Entered {
                    quantity,
                    total_value,
                    ..
                } => debug!(
                    "day {} BUY {} x{} @ {:.2} ({:.2}): {}",
                    day, inst.symbol, quantity, bar.close, total_value, reason
                ),
                EntryResult::InsufficientCapital => debug!(
                    "day {} dropped {} entry, cash {:.2} too small: {}",
                    day, inst.symbol, portfolio.cash, reason
                ),
            }
        }
        Signal::Exit(reason) => {
            let exit = portfolio.apply_sell(&inst.symbol, bar.date, day, bar.close, reason)?;
            debug!(
                "day {} SELL {} x{} @ {:.2} P/L {:.2}: {}",
                day, inst.symbol, exit.quantity, exit.price, exit.realized_profit_loss, reason
            );
        }
    }
    Ok(())
}
