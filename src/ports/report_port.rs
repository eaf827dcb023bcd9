//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StratbenchError;
use crate::domain::metrics::{RunReport, StrategyResult};

/// Port for writing backtest reports.
pub trait ReportPort {
    /// Detailed report of a single run.
    fn write_run(
        &self,
        result: &BacktestResult,
        summary: &StrategyResult,
        report: &RunReport,
        output_path: &str,
    ) -> Result<(), StratbenchError>;

    /// Side-by-side report of several runs, in the order given.
    fn write_comparison(
        &self,
        results: &[StrategyResult],
        output_path: &str,
    ) -> Result<(), StratbenchError>;
}
