//! Fuel, emission, and economic calculators.
//!
//! All functions are total: degenerate inputs (zero capacity or efficiency)
//! yield 0 rather than an error.

use serde::{Deserialize, Serialize};

use crate::grid::Engine;

/// Kilograms of CO2 released per liter of diesel burned.
pub const DIESEL_CO2_KG_PER_LITER: f64 = 2.7;

/// Default diesel price in currency units per liter.
pub const DEFAULT_FUEL_PRICE_PER_LITER: f64 = 1.5;

/// Ratio of output to maximum capacity.
///
/// Returns 0 when `max_capacity` is 0 (or negative); within
/// `0 <= output <= max_capacity` the result lies in [0, 1].
pub fn efficiency_ratio(output: f64, max_capacity: f64) -> f64 {
    if max_capacity <= 0.0 {
        return 0.0;
    }
    output / max_capacity
}

/// Hourly fuel consumption of the fleet in liters.
///
/// Sum over running engines of output divided by efficiency; stopped engines
/// contribute nothing regardless of stale output values, and engines with a
/// non-positive efficiency are skipped.
pub fn fuel_consumption(engines: &[Engine]) -> f64 {
    engines
        .iter()
        .filter(|e| e.is_running && e.efficiency > 0.0)
        .map(|e| e.current_output / e.efficiency)
        .sum()
}

/// CO2 mass in kilograms for the given liters of diesel.
pub fn carbon_emissions(fuel_liters: f64) -> f64 {
    fuel_liters * DIESEL_CO2_KG_PER_LITER
}

/// Fuel cost for the given liters at the given price per liter.
pub fn fuel_cost(fuel_liters: f64, price_per_liter: f64) -> f64 {
    fuel_liters * price_per_liter
}

/// Economic and environmental effect of solar substituting for diesel.
///
/// A counterfactual computed from aggregate solar output: the fuel that was
/// *not* burned because solar covered the load, not tied to any one engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicImpact {
    /// Liters of diesel not burned.
    pub fuel_saved: f64,
    /// Currency saved at the configured fuel price.
    pub cost_reduction: f64,
    /// Kilograms of CO2 not emitted.
    pub carbon_offset: f64,
}

/// Computes the economic impact of `solar_output` kWh covered by solar
/// instead of engines with the given average efficiency (kWh per liter).
///
/// Returns all-zero impact when `avg_engine_efficiency` is not positive.
pub fn economic_impact(
    solar_output: f64,
    avg_engine_efficiency: f64,
    price_per_liter: f64,
) -> EconomicImpact {
    let fuel_saved = if avg_engine_efficiency > 0.0 {
        solar_output / avg_engine_efficiency
    } else {
        0.0
    };
    EconomicImpact {
        fuel_saved,
        cost_reduction: fuel_cost(fuel_saved, price_per_liter),
        carbon_offset: carbon_emissions(fuel_saved),
    }
}
