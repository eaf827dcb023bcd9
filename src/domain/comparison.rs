//! Running several strategies over the same instruments.
//!
//! Each run gets its own fresh portfolio, so runs are independent and are
//! evaluated in parallel. Results come back in input order.

use rayon::prelude::*;

use super::backtest::{BacktestConfig, run_backtest, validate_instruments};
use super::error::StratbenchError;
use super::metrics::{StrategyResult, summarize};
use super::ohlcv::Instrument;
use super::strategy::{PresetId, StrategyChoice, StrategyParameters};

/// Owner recorded for the built-in presets.
pub const SYSTEM_OWNER: &str = "System";

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRun {
    pub choice: StrategyChoice,
    pub owner_id: String,
}

/// The three presets (owned by [`SYSTEM_OWNER`]) followed by `custom`
/// strategies owned by `owner`.
pub fn standard_runs(custom: &[StrategyParameters], owner: &str) -> Vec<StrategyRun> {
    PresetId::all()
        .into_iter()
        .map(|id| StrategyRun {
            choice: StrategyChoice::UsePreset(id),
            owner_id: SYSTEM_OWNER.to_string(),
        })
        .chain(custom.iter().map(|params| StrategyRun {
            choice: StrategyChoice::Custom(params.clone()),
            owner_id: owner.to_string(),
        }))
        .collect()
}

pub fn compare_strategies(
    instruments: &[Instrument],
    runs: &[StrategyRun],
    config: &BacktestConfig,
) -> Result<Vec<StrategyResult>, StratbenchError> {
    validate_instruments(instruments)?;

    runs.par_iter()
        .map(|run| -> Result<StrategyResult, StratbenchError> {
            let params = run.choice.resolve();
            let result = run_backtest(instruments, &params, config)?;
            Ok(summarize(
                &result.portfolio,
                instruments,
                config.initial_capital,
                &params.name,
                &run.owner_id,
            ))
        })
        .collect()
}
