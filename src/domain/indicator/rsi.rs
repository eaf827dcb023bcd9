//! RSI (Relative Strength Index).
//!
//! Computed over the `period` most recent day-to-day close changes ending at
//! the evaluation day:
//! - avg_gain = sum of positive changes / period
//! - avg_loss = sum of |negative changes| / period
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: until `period` changes exist the reading is the neutral 50.

/// Reading reported while the look-back window is incomplete.
pub const NEUTRAL_RSI: f64 = 50.0;

pub fn rsi(closes: &[f64], as_of_day: usize, period: usize) -> f64 {
    if period == 0 || as_of_day < period || as_of_day >= closes.len() {
        return NEUTRAL_RSI;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;

    for i in (as_of_day + 1 - period)..=as_of_day {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses += -change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
}
