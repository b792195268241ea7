//! API response and request types.
//!
//! All JSON field names are camelCase, matching the serde renames on the
//! grid and optimization types.

use serde::Serialize;

use crate::grid::{ConsumptionRecord, EnergyStorage, Engine, SimClock, SolarRecord};

/// Combined grid snapshot: clock, fleet, battery, and the current hour's
/// signals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    /// Simulation clock position.
    pub clock: SimClock,
    /// Complete engine fleet.
    pub engines: Vec<Engine>,
    /// Battery state, absent when the grid has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<EnergyStorage>,
    /// Solar record for the current (day, hour) slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solar: Option<SolarRecord>,
    /// Consumption record for the current (day, hour) slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption: Option<ConsumptionRecord>,
    /// Energy balance: engines + solar - demand (kWh).
    pub balance: f64,
}

/// Body for `PATCH /solar/{id}`.
#[derive(Debug, serde::Deserialize)]
pub struct SolarPatch {
    pub output: f64,
}

/// Body for `PATCH /consumption/{id}`.
#[derive(Debug, serde::Deserialize)]
pub struct ConsumptionPatch {
    pub demand: f64,
}

/// Acknowledgement body for apply/advance style operations.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
