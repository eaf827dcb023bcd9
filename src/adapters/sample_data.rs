//! Synthetic price data for trying the tool without a real data set.
//!
//! Each instrument follows a seeded random walk, so the same seed always
//! produces the same file.

use crate::domain::ohlcv::PricePoint;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_DAYS: usize = 50;

struct Profile {
    symbol: &'static str,
    base: f64,
    /// Largest day-to-day move of the walk, in cents.
    step_cents: i32,
    /// Largest open-to-close gap, in cents.
    body_cents: i32,
    /// Largest wick beyond the body, in cents.
    wick_cents: i32,
    volume_base: i64,
    volume_range: i64,
}

const PROFILES: [Profile; 3] = [
    Profile {
        symbol: "TECH_A",
        base: 100.0,
        step_cents: 300,
        body_cents: 200,
        wick_cents: 200,
        volume_base: 100_000,
        volume_range: 50_000,
    },
    Profile {
        symbol: "FINANCE_B",
        base: 150.0,
        step_cents: 400,
        body_cents: 250,
        wick_cents: 250,
        volume_base: 80_000,
        volume_range: 40_000,
    },
    Profile {
        symbol: "ENERGY_C",
        base: 75.0,
        step_cents: 250,
        body_cents: 150,
        wick_cents: 150,
        volume_base: 120_000,
        volume_range: 60_000,
    },
];

const MIN_PRICE: f64 = 1.0;

fn cents(rng: &mut StdRng, max: i32) -> f64 {
    rng.gen_range(-max..max) as f64 / 100.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// `days` consecutive calendar days of prices for each sample instrument,
/// starting at `start`.
pub fn generate(seed: u64, start: NaiveDate, days: usize) -> Vec<(String, Vec<PricePoint>)> {
    let mut rng = StdRng::seed_from_u64(seed);

    PROFILES
        .iter()
        .map(|profile| {
            let mut level = profile.base;
            let prices = (0..days)
                .map(|i| {
                    level = (level + cents(&mut rng, profile.step_cents)).max(MIN_PRICE);
                    let open = round2(level);
                    let close = round2((level + cents(&mut rng, profile.body_cents)).max(MIN_PRICE));
                    let high =
                        round2(open.max(close) + rng.gen_range(0..profile.wick_cents) as f64 / 100.0);
                    let low = round2(
                        (open.min(close) - rng.gen_range(0..profile.wick_cents) as f64 / 100.0)
                            .max(MIN_PRICE / 2.0),
                    );
                    PricePoint {
                        date: start + Duration::days(i as i64),
                        open,
                        high,
                        low,
                        close,
                        volume: profile.volume_base + rng.gen_range(0..profile.volume_range),
                    }
                })
                .collect();
            (profile.symbol.to_string(), prices)
        })
        .collect()
}
