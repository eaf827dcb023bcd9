//! Plain-text report adapter.
//!
//! Renders the detailed single-run report and the strategy comparison report.
//! The `render_*` functions only build strings; [`TextReportAdapter`] writes
//! them to disk.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StratbenchError;
use crate::domain::metrics::{RunReport, StrategyResult, best_performer, rank};
use crate::domain::position::{Trade, TradeSide};
use crate::ports::report_port::ReportPort;

const RULE: &str =
    "================================================================================";
const THIN_RULE: &str =
    "--------------------------------------------------------------------------------";
const WIDTH: usize = 80;

pub struct TextReportAdapter {
    pub show_trades: bool,
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self { show_trades: true }
    }
}

fn banner(out: &mut String, title: &str) {
    out.push_str(RULE);
    out.push('\n');
    let _ = writeln!(out, "{:^width$}", title, width = WIDTH);
    out.push_str(RULE);
    out.push_str("\n\n");
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}:", title);
    out.push_str(THIN_RULE);
    out.push('\n');
}

fn format_trade(out: &mut String, number: usize, trade: &Trade) {
    let _ = writeln!(out, "TRADE #{} - {} {}", number, trade.side, trade.symbol);
    out.push_str(THIN_RULE);
    out.push('\n');
    let _ = writeln!(
        out,
        "Date:                    {} (Day {})",
        trade.date, trade.day_index
    );
    let _ = writeln!(out, "Reason:                  {}", trade.reason);
    let _ = writeln!(out, "Price per Share:         ${:.2}", trade.price);
    let _ = writeln!(out, "Quantity:                {} shares", trade.quantity);
    let _ = writeln!(out, "Total Transaction Value: ${:.2}", trade.total_value);
    let _ = writeln!(out, "Portfolio Cash Before:   ${:.2}", trade.cash_before);
    let _ = writeln!(out, "Portfolio Cash After:    ${:.2}", trade.cash_after);
    if trade.side == TradeSide::Sell {
        if trade.realized_profit_loss > 0.0 {
            let _ = writeln!(
                out,
                "Profit:                  ${:.2} ✓",
                trade.realized_profit_loss
            );
        } else {
            let _ = writeln!(
                out,
                "Loss:                    ${:.2} ✗",
                trade.realized_profit_loss
            );
        }
    }
    out.push('\n');
}

/// Full report of one run: trade history, portfolio summary, trading
/// statistics and the positions still open at the end.
pub fn render_run_report(
    result: &BacktestResult,
    summary: &StrategyResult,
    report: &RunReport,
    show_trades: bool,
) -> String {
    let mut out = String::new();
    banner(&mut out, "DETAILED BACKTEST RESULTS");

    let _ = writeln!(out, "Strategy:                {}", result.strategy.name);
    let _ = writeln!(out, "Parameters:              {}", result.strategy);
    let _ = writeln!(
        out,
        "Days Simulated:          {} (Day {} to Day {})",
        result.days_simulated(),
        result.first_day,
        result.end_day
    );
    out.push('\n');

    if show_trades {
        let _ = writeln!(out, "COMPLETE TRADE HISTORY:");
        out.push_str(RULE);
        out.push_str("\n\n");
        let trades = result.portfolio.trades();
        if trades.is_empty() {
            out.push_str("No trades executed.\n\n");
        }
        for (i, trade) in trades.iter().enumerate() {
            format_trade(&mut out, i + 1, trade);
        }
    }

    banner(&mut out, "PORTFOLIO SUMMARY");
    let _ = writeln!(out, "Initial Capital:         ${:.2}", summary.initial_capital);
    let _ = writeln!(out, "Final Portfolio Value:   ${:.2}", report.final_value);
    let _ = writeln!(out, "Final Cash Balance:      ${:.2}", report.final_cash);
    let _ = writeln!(
        out,
        "Total Return:            ${:.2} ({:.2}%)",
        summary.total_return, summary.return_pct
    );
    let _ = writeln!(
        out,
        "Total Realized Profit:   ${:.2}",
        report.total_realized_profit
    );
    let _ = writeln!(
        out,
        "Max Drawdown:            {:.2}%",
        report.max_drawdown * 100.0
    );
    out.push('\n');

    section(&mut out, "TRADING STATISTICS");
    let _ = writeln!(out, "Total Trades:            {}", summary.trade_count);
    let _ = writeln!(out, "Buy Orders:              {}", report.buy_count);
    let _ = writeln!(out, "Sell Orders:             {}", report.sell_count);
    let _ = writeln!(out, "Winning Trades:          {}", summary.win_count);
    let _ = writeln!(out, "Losing Trades:           {}", summary.loss_count);
    if report.sell_count > 0 {
        let _ = writeln!(
            out,
            "Win Rate:                {:.2}%",
            summary.win_rate * 100.0
        );
        let _ = writeln!(
            out,
            "Average Profit per Trade: ${:.2}",
            report.avg_profit_per_trade
        );
    }
    let _ = writeln!(out, "Total Money Invested:    ${:.2}", report.total_invested);
    out.push('\n');

    section(&mut out, "CURRENT OPEN POSITIONS");
    if report.open_positions.is_empty() {
        out.push_str("No open positions - All cash\n\n");
    }
    for pos in &report.open_positions {
        let _ = writeln!(out, "{}:", pos.symbol);
        let _ = writeln!(out, "  Quantity:              {} shares", pos.quantity);
        let _ = writeln!(out, "  Average Buy Price:     ${:.2}", pos.avg_buy_price);
        let _ = writeln!(out, "  Current Price:         ${:.2}", pos.current_price);
        let _ = writeln!(out, "  Position Value:        ${:.2}", pos.market_value);
        let _ = writeln!(
            out,
            "  Unrealized P/L:        ${:.2} ({:.2}%)",
            pos.unrealized_pnl, pos.unrealized_pct
        );
        out.push('\n');
    }
    out.push_str(RULE);
    out.push('\n');
    out
}

/// Comparison of several runs: one block per strategy in input order with
/// the best performer marked, then a ranking table by return %.
pub fn render_comparison(results: &[StrategyResult]) -> String {
    let mut out = String::new();
    banner(&mut out, "STRATEGY COMPARISON REPORT");

    let _ = writeln!(out, "PERFORMANCE COMPARISON:");
    out.push_str(RULE);
    out.push_str("\n\n");

    let best = best_performer(results);
    for (i, r) in results.iter().enumerate() {
        let _ = write!(out, "STRATEGY #{}: {}", i + 1, r.strategy_name);
        if best == Some(i) {
            out.push_str(" ⭐ BEST PERFORMER");
        }
        out.push('\n');
        out.push_str(THIN_RULE);
        out.push('\n');
        let _ = writeln!(out, "Owner:                   {}", r.owner_id);
        let _ = writeln!(out, "Initial Capital:         ${:.2}", r.initial_capital);
        let _ = writeln!(out, "Final Value:             ${:.2}", r.final_value);
        let _ = writeln!(
            out,
            "Total Return:            ${:.2} ({:.2}%)",
            r.total_return, r.return_pct
        );
        let _ = writeln!(out, "Total Trades:            {}", r.trade_count);
        let _ = writeln!(out, "Winning Trades:          {}", r.win_count);
        let _ = writeln!(out, "Losing Trades:           {}", r.loss_count);
        let _ = writeln!(out, "Win Rate:                {:.2}%", r.win_rate * 100.0);
        let _ = writeln!(
            out,
            "Realized Profit:         ${:.2}",
            r.total_realized_profit
        );
        out.push('\n');
    }

    banner(&mut out, "RANKING BY RETURN %");
    out.push_str("Rank | Strategy Name                    | Return %   | Total Return\n");
    out.push_str(THIN_RULE);
    out.push('\n');
    for (i, r) in rank(results).iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} | {:<32} | {:>8.2}% | ${:.2}",
            i + 1,
            r.strategy_name,
            r.return_pct,
            r.total_return
        );
    }
    out.push_str(RULE);
    out.push('\n');
    out
}

fn write_file(output_path: &str, content: &str) -> Result<(), StratbenchError> {
    let path = Path::new(output_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(StratbenchError::Io)?;
    }
    fs::write(path, content).map_err(StratbenchError::Io)?;
    Ok(())
}

impl ReportPort for TextReportAdapter {
    fn write_run(
        &self,
        result: &BacktestResult,
        summary: &StrategyResult,
        report: &RunReport,
        output_path: &str,
    ) -> Result<(), StratbenchError> {
        write_file(
            output_path,
            &render_run_report(result, summary, report, self.show_trades),
        )
    }

    fn write_comparison(
        &self,
        results: &[StrategyResult],
        output_path: &str,
    ) -> Result<(), StratbenchError> {
        write_file(output_path, &render_comparison(results))
    }
}
