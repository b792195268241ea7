//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::grid::clock::{DAYS_PER_WEEK, HOURS_PER_DAY};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields default to the baseline scenario. Load from TOML with
/// [`ScenarioConfig::from_toml_file`] or use [`ScenarioConfig::baseline`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Fuel pricing and emissions.
    #[serde(default)]
    pub fuel: FuelConfig,
    /// Battery storage parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Procedural profile parameters.
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Engine fleet; defaults to the three-engine baseline fleet.
    #[serde(default = "default_fleet")]
    pub engines: Vec<EngineConfig>,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Day the run starts on (1-7).
    pub start_day: u8,
    /// Hour the run starts at (0-23).
    pub start_hour: u8,
    /// Number of hours to simulate.
    pub hours: u32,
    /// Master random seed for profile generation.
    pub seed: u64,
    /// Whether freshly created engines come up running or on standby.
    pub engines_start_running: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_day: 1,
            start_hour: 8,
            hours: 24,
            seed: 42,
            engines_start_running: true,
        }
    }
}

/// Fuel pricing and emissions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuelConfig {
    /// Diesel price per liter.
    pub price_per_liter: f64,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            price_per_liter: 1.5,
        }
    }
}

/// Battery storage parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Total capacity (kWh); 0 disables the battery.
    pub max_capacity: f64,
    /// Initial charge (kWh).
    pub initial_charge: f64,
    /// Charge efficiency (0-1).
    pub charge_efficiency: f64,
    /// Discharge efficiency (0-1).
    pub discharge_efficiency: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            max_capacity: 600.0,
            initial_charge: 450.0,
            charge_efficiency: 0.9,
            discharge_efficiency: 0.95,
        }
    }
}

/// Procedural profile parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    /// Multiplier on the solar reference shape.
    pub solar_scale: f64,
    /// Multiplier on the demand reference shape.
    pub demand_scale: f64,
    /// Demand multiplier on days 6 and 7.
    pub weekend_factor: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            solar_scale: 1.0,
            demand_scale: 1.0,
            weekend_factor: 0.6,
        }
    }
}

/// One engine in the configured fleet.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Display name.
    pub name: String,
    /// Maximum hourly output (kWh, > 0).
    pub max_capacity: f64,
    /// Fuel efficiency (kWh per liter, > 0).
    pub efficiency: f64,
    /// Economically optimal output (kWh, > 0).
    pub optimal_threshold: f64,
}

fn default_fleet() -> Vec<EngineConfig> {
    vec![
        EngineConfig {
            name: "Engine Alpha".to_string(),
            max_capacity: 500.0,
            efficiency: 4.2,
            optimal_threshold: 150.0,
        },
        EngineConfig {
            name: "Engine Beta".to_string(),
            max_capacity: 350.0,
            efficiency: 3.8,
            optimal_threshold: 100.0,
        },
        EngineConfig {
            name: "Engine Gamma".to_string(),
            max_capacity: 650.0,
            efficiency: 5.1,
            optimal_threshold: 200.0,
        },
    ]
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.start_day"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: three-engine industrial site, one day.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            fuel: FuelConfig::default(),
            battery: BatteryConfig::default(),
            profile: ProfileConfig::default(),
            engines: default_fleet(),
        }
    }

    /// Returns the solar-heavy preset: oversized PV, small fleet.
    pub fn solar_heavy() -> Self {
        Self {
            profile: ProfileConfig {
                solar_scale: 1.6,
                ..ProfileConfig::default()
            },
            battery: BatteryConfig {
                max_capacity: 900.0,
                initial_charge: 300.0,
                ..BatteryConfig::default()
            },
            engines: vec![
                EngineConfig {
                    name: "Engine Alpha".to_string(),
                    max_capacity: 500.0,
                    efficiency: 4.2,
                    optimal_threshold: 150.0,
                },
                EngineConfig {
                    name: "Engine Gamma".to_string(),
                    max_capacity: 650.0,
                    efficiency: 5.1,
                    optimal_threshold: 200.0,
                },
            ],
            ..Self::baseline()
        }
    }

    /// Returns the night-shift preset: demand stays high overnight while a
    /// full week is simulated.
    pub fn night_shift() -> Self {
        Self {
            simulation: SimulationConfig {
                start_day: 1,
                start_hour: 20,
                hours: 7 * 24,
                ..SimulationConfig::default()
            },
            profile: ProfileConfig {
                demand_scale: 1.3,
                weekend_factor: 0.9,
                ..ProfileConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "solar_heavy", "night_shift"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "solar_heavy" => Ok(Self::solar_heavy()),
            "night_shift" => Ok(Self::night_shift()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or has unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if !(1..=DAYS_PER_WEEK).contains(&s.start_day) {
            errors.push(ConfigError {
                field: "simulation.start_day".into(),
                message: "must be in 1..=7".into(),
            });
        }
        if s.start_hour >= HOURS_PER_DAY {
            errors.push(ConfigError {
                field: "simulation.start_hour".into(),
                message: "must be in 0..=23".into(),
            });
        }
        if s.hours == 0 {
            errors.push(ConfigError {
                field: "simulation.hours".into(),
                message: "must be > 0".into(),
            });
        }

        if self.fuel.price_per_liter <= 0.0 {
            errors.push(ConfigError {
                field: "fuel.price_per_liter".into(),
                message: "must be > 0".into(),
            });
        }

        let bat = &self.battery;
        if bat.max_capacity < 0.0 {
            errors.push(ConfigError {
                field: "battery.max_capacity".into(),
                message: "must be >= 0".into(),
            });
        }
        if bat.initial_charge < 0.0 || bat.initial_charge > bat.max_capacity {
            errors.push(ConfigError {
                field: "battery.initial_charge".into(),
                message: "must be in [0, battery.max_capacity]".into(),
            });
        }
        if !(0.0..=1.0).contains(&bat.charge_efficiency) {
            errors.push(ConfigError {
                field: "battery.charge_efficiency".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }
        if !(0.0..=1.0).contains(&bat.discharge_efficiency) {
            errors.push(ConfigError {
                field: "battery.discharge_efficiency".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        let p = &self.profile;
        if p.solar_scale < 0.0 {
            errors.push(ConfigError {
                field: "profile.solar_scale".into(),
                message: "must be >= 0".into(),
            });
        }
        if p.demand_scale < 0.0 {
            errors.push(ConfigError {
                field: "profile.demand_scale".into(),
                message: "must be >= 0".into(),
            });
        }

        if self.engines.is_empty() {
            errors.push(ConfigError {
                field: "engines".into(),
                message: "at least one engine is required".into(),
            });
        }
        for (i, e) in self.engines.iter().enumerate() {
            if e.max_capacity <= 0.0 {
                errors.push(ConfigError {
                    field: format!("engines[{i}].max_capacity"),
                    message: "must be > 0".into(),
                });
            }
            if e.efficiency <= 0.0 {
                errors.push(ConfigError {
                    field: format!("engines[{i}].efficiency"),
                    message: "must be > 0".into(),
                });
            }
            if e.optimal_threshold <= 0.0 || e.optimal_threshold > e.max_capacity {
                errors.push(ConfigError {
                    field: format!("engines[{i}].optimal_threshold"),
                    message: "must be > 0 and <= max_capacity".into(),
                });
            }
        }

        errors
    }
}
