//! Core grid types: engines, battery storage, and time-indexed signals.

use serde::{Deserialize, Serialize};

/// A dispatchable diesel engine.
///
/// Output and capacity are hourly energy figures (kWh per hour), efficiency
/// is kWh produced per liter of fuel. `optimal_threshold` is the output at
/// which the engine runs most economically; by convention it does not exceed
/// `max_capacity`, though the store does not enforce this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engine {
    /// Unique engine id assigned by the store.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Maximum hourly output (kWh, > 0).
    pub max_capacity: f64,
    /// Fuel efficiency (kWh per liter, > 0).
    pub efficiency: f64,
    /// Economically optimal output (kWh, > 0).
    pub optimal_threshold: f64,
    /// Whether the engine is currently dispatched.
    pub is_running: bool,
    /// Current hourly output (kWh; 0 when stopped).
    pub current_output: f64,
}

impl Engine {
    /// Ratio of current output to maximum capacity, 0 when capacity is 0.
    pub fn load_ratio(&self) -> f64 {
        crate::opt::fuel::efficiency_ratio(self.current_output, self.max_capacity)
    }
}

/// Solar production for one (day, hour) slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarRecord {
    /// Record id assigned by the store.
    pub id: u32,
    /// Simulation day (1-7).
    pub day: u8,
    /// Hour of day (0-23).
    pub hour: u8,
    /// Produced energy (kWh).
    pub output: f64,
    /// Descriptive weather tag ("Sunny", "Overcast", ...).
    pub weather: String,
}

/// Energy demand for one (day, hour) slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRecord {
    /// Record id assigned by the store.
    pub id: u32,
    /// Simulation day (1-7).
    pub day: u8,
    /// Hour of day (0-23).
    pub hour: u8,
    /// Demanded energy (kWh).
    pub demand: f64,
    /// Dominant consumption source for the hour.
    pub source: String,
}

/// Battery energy storage, a single logical instance per grid.
///
/// The optimization core only reads the fill level; actual charge transfer
/// is left to the caller that owns the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyStorage {
    /// Total capacity (kWh).
    pub max_capacity: f64,
    /// Currently stored energy (kWh).
    pub current_charge: f64,
    /// Charging efficiency (0-1).
    pub charge_efficiency: f64,
    /// Discharging efficiency (0-1).
    pub discharge_efficiency: f64,
}

impl EnergyStorage {
    /// Fill level as a fraction in [0, 1], 0 when capacity is 0.
    pub fn level(&self) -> f64 {
        if self.max_capacity <= 0.0 {
            return 0.0;
        }
        self.current_charge / self.max_capacity
    }

    /// Fill level as a percentage in [0, 100].
    pub fn level_percent(&self) -> f64 {
        self.level() * 100.0
    }
}

/// Sums the output of all running engines.
pub fn running_output(engines: &[Engine]) -> f64 {
    engines
        .iter()
        .filter(|e| e.is_running)
        .map(|e| e.current_output)
        .sum()
}

/// Energy balance: engine output plus solar, minus demand.
///
/// Positive means the grid overproduces, negative means a deficit.
pub fn energy_balance(engines: &[Engine], solar: f64, demand: f64) -> f64 {
    running_output(engines) + solar - demand
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(id: u32, running: bool, output: f64) -> Engine {
        Engine {
            id,
            name: format!("E{id}"),
            max_capacity: 500.0,
            efficiency: 4.0,
            optimal_threshold: 150.0,
            is_running: running,
            current_output: output,
        }
    }

    #[test]
    fn running_output_ignores_stopped_engines() {
        let engines = vec![engine(1, true, 200.0), engine(2, false, 300.0)];
        assert_eq!(running_output(&engines), 200.0);
    }

    #[test]
    fn energy_balance_sign() {
        let engines = vec![engine(1, true, 300.0)];
        assert_eq!(energy_balance(&engines, 100.0, 350.0), 50.0);
        assert_eq!(energy_balance(&engines, 0.0, 400.0), -100.0);
    }

    #[test]
    fn storage_level_fraction() {
        let storage = EnergyStorage {
            max_capacity: 600.0,
            current_charge: 450.0,
            charge_efficiency: 0.9,
            discharge_efficiency: 0.95,
        };
        assert!((storage.level() - 0.75).abs() < 1e-12);
        assert!((storage.level_percent() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn storage_level_zero_capacity() {
        let storage = EnergyStorage {
            max_capacity: 0.0,
            current_charge: 10.0,
            charge_efficiency: 1.0,
            discharge_efficiency: 1.0,
        };
        assert_eq!(storage.level(), 0.0);
    }

    #[test]
    fn engine_serializes_camel_case() {
        // serde_json is feature-gated, so check the renames via toml.
        let serialized = toml::to_string(&engine(1, true, 120.0)).unwrap();
        assert!(serialized.contains("maxCapacity"));
        assert!(serialized.contains("isRunning"));
        assert!(serialized.contains("currentOutput"));
        assert!(serialized.contains("optimalThreshold"));
    }
}
