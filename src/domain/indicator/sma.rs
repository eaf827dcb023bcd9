//! Simple moving average.
//!
//! SMA(n) as of day d = mean of closes[d-n+1..=d].
//!
//! Undefined (`None`) when the window does not fit: period 0, fewer than n
//! closes up to d, or d past the end of the series.

pub fn sma(closes: &[f64], as_of_day: usize, period: usize) -> Option<f64> {
    if period == 0 || as_of_day + 1 < period || as_of_day >= closes.len() {
        return None;
    }

    let window = &closes[as_of_day + 1 - period..=as_of_day];
    let sum: f64 = window.iter().rev().sum();
    Some(sum / period as f64)
}
