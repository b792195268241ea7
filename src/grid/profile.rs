//! Procedural generation of the weekly solar and consumption profiles.
//!
//! The grid is seeded with 7 days x 24 hours of solar output and demand
//! following a fixed industrial-site shape, with seeded per-day and per-hour
//! variation so runs are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::clock::{DAYS_PER_WEEK, HOURS_PER_DAY};

/// Reference solar output by hour of day (kWh), peaking around noon.
const SOLAR_SHAPE: [f64; 24] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 10.0, 45.0, 120.0, 280.0, 410.0, 520.0, 590.0, 620.0, 580.0, 510.0,
    390.0, 240.0, 90.0, 20.0, 0.0, 0.0, 0.0, 0.0, 0.0,
];

/// Reference demand by hour of day (kWh) for an industrial facility with
/// working-hours load.
const DEMAND_SHAPE: [f64; 24] = [
    120.0, 110.0, 100.0, 90.0, 95.0, 150.0, 280.0, 450.0, 600.0, 680.0, 720.0, 750.0, 720.0,
    700.0, 680.0, 650.0, 550.0, 420.0, 350.0, 300.0, 250.0, 180.0, 150.0, 130.0,
];

/// Generated (day, hour, value, tag) tuple for one profile slot.
#[derive(Debug, Clone)]
pub struct ProfileSlot {
    pub day: u8,
    pub hour: u8,
    pub value: f64,
    pub tag: String,
}

/// Tuning knobs for the procedural profiles.
#[derive(Debug, Clone, Copy)]
pub struct ProfileParams {
    /// Multiplier applied to the solar reference shape.
    pub solar_scale: f64,
    /// Multiplier applied to the demand reference shape.
    pub demand_scale: f64,
    /// Demand multiplier on days 6 and 7.
    pub weekend_factor: f64,
}

impl Default for ProfileParams {
    fn default() -> Self {
        Self {
            solar_scale: 1.0,
            demand_scale: 1.0,
            weekend_factor: 0.6,
        }
    }
}

/// Generates the weekly solar profile (7 x 24 slots in day/hour order).
///
/// Each day draws a multiplier in [0.8, 1.2) and each hour a jitter in
/// [0.9, 1.1), mirroring the shape while keeping output reproducible for a
/// fixed seed. The weather tag is derived from actual versus expected output.
pub fn generate_solar(params: &ProfileParams, seed: u64) -> Vec<ProfileSlot> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut slots = Vec::with_capacity((DAYS_PER_WEEK as usize) * (HOURS_PER_DAY as usize));

    for day in 1..=DAYS_PER_WEEK {
        let daily = rng.random_range(0.8..1.2);
        for hour in 0..HOURS_PER_DAY {
            let base = SOLAR_SHAPE[hour as usize] * params.solar_scale;
            let output = (base * daily * rng.random_range(0.9..1.1)).round();
            slots.push(ProfileSlot {
                day,
                hour,
                value: output,
                tag: weather_tag(output, base).to_string(),
            });
        }
    }
    slots
}

/// Generates the weekly demand profile (7 x 24 slots in day/hour order).
///
/// Days 6 and 7 carry the weekend factor; every hour draws a jitter in
/// [0.95, 1.05). The source tag reflects the dominant consumer for the hour.
pub fn generate_consumption(params: &ProfileParams, seed: u64) -> Vec<ProfileSlot> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut slots = Vec::with_capacity((DAYS_PER_WEEK as usize) * (HOURS_PER_DAY as usize));

    for day in 1..=DAYS_PER_WEEK {
        let day_factor = if day >= 6 { params.weekend_factor } else { 1.0 };
        for hour in 0..HOURS_PER_DAY {
            let base = DEMAND_SHAPE[hour as usize] * params.demand_scale;
            let demand = (base * day_factor * rng.random_range(0.95..1.05)).round();
            slots.push(ProfileSlot {
                day,
                hour,
                value: demand,
                tag: consumption_source(hour).to_string(),
            });
        }
    }
    slots
}

/// Weather condition inferred from actual output relative to the clear-sky
/// expectation for that hour.
fn weather_tag(actual: f64, expected: f64) -> &'static str {
    if expected <= 0.0 {
        return "Night";
    }
    let ratio = actual / expected;
    if ratio > 0.9 {
        "Sunny"
    } else if ratio > 0.7 {
        "Partly Cloudy"
    } else if ratio > 0.4 {
        "Cloudy"
    } else {
        "Overcast"
    }
}

/// Dominant consumption source by hour of day.
fn consumption_source(hour: u8) -> &'static str {
    match hour {
        8..=17 => "Production Line",
        6..=7 => "Startup Procedures",
        18..=20 => "Maintenance",
        _ => "Base Facilities",
    }
}
