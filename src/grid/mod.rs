//! Grid state: engines, battery, time-indexed signals, and the clock.

pub mod clock;
pub mod profile;
pub mod types;

pub use clock::SimClock;
pub use types::{ConsumptionRecord, EnergyStorage, Engine, SolarRecord, energy_balance, running_output};
