//! Core domain types and logic.

pub mod ohlcv;
pub mod position;
pub mod portfolio;
pub mod signal;
pub mod indicator;
pub mod backtest;
pub mod metrics;
pub mod comparison;
pub mod strategy;
pub mod universe;
pub mod config_validation;
pub mod error;
