//! Dispatch instruction generator.
//!
//! Produces immediate (current-hour) instructions from the live snapshot and
//! scheduled instructions from a forecast window of up to six hours. Emission
//! order follows the rule-check order, then forecast hour ascending; no
//! secondary sort is applied.

use serde::{Deserialize, Serialize};

use crate::grid::{Engine, types::running_output};

/// Maximum number of forecast steps considered.
pub const FORECAST_HORIZON: usize = 6;

/// Deficit magnitude (kWh) below which the current balance is tolerated.
const DEFICIT_MARGIN_KWH: f64 = 20.0;
/// Deficit magnitude (kWh) past which starting a standby engine is preferred
/// over discharging the battery.
const ENGINE_START_DEFICIT_KWH: f64 = 50.0;
/// Surplus (kWh) past which shedding an engine is suggested.
const SURPLUS_MARGIN_KWH: f64 = 50.0;

/// Instruction urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Whether an instruction applies now or to a scheduled future hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionKind {
    Immediate,
    Scheduled,
}

/// An actionable instruction for the current hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(rename = "type")]
    pub kind: InstructionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// A predicted instruction for a specific future (day, hour); always
/// scheduled, so no kind field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastInstruction {
    pub day: u8,
    pub hour: u8,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Output of [`generate_instructions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionSet {
    pub current_instructions: Vec<Instruction>,
    pub forecast_instructions: Vec<ForecastInstruction>,
}

/// Generates current and forecast instructions for engine dispatch.
///
/// # Arguments
///
/// * `engines` - Full fleet, running and standby
/// * `current_solar` - Solar production this hour (kWh)
/// * `current_demand` - Demand this hour (kWh)
/// * `forecast_solar` / `forecast_demand` - Aligned per-hour forecasts; only
///   the first `min(len, len, 6)` steps are considered
/// * `current_day` / `current_hour` - Clock position the forecast extends from
/// * `battery_level` - Battery fill in percent (0-100)
pub fn generate_instructions(
    engines: &[Engine],
    current_solar: f64,
    current_demand: f64,
    forecast_solar: &[f64],
    forecast_demand: &[f64],
    current_day: u8,
    current_hour: u8,
    battery_level: f64,
) -> InstructionSet {
    InstructionSet {
        current_instructions: current_instructions(
            engines,
            current_solar,
            current_demand,
            battery_level,
        ),
        forecast_instructions: forecast_instructions(
            forecast_solar,
            forecast_demand,
            current_solar,
            current_demand,
            current_day,
            current_hour,
        ),
    }
}

fn current_instructions(
    engines: &[Engine],
    solar: f64,
    demand: f64,
    battery_level: f64,
) -> Vec<Instruction> {
    let mut out = Vec::new();
    let balance = running_output(engines) + solar - demand;

    if balance < -DEFICIT_MARGIN_KWH {
        let deficit = -balance;
        let standby: Vec<&Engine> = engines.iter().filter(|e| !e.is_running).collect();

        if !standby.is_empty() && deficit > ENGINE_START_DEFICIT_KWH {
            // Prefer the most efficient standby engine whose operating window
            // covers the deficit; fall back to the most efficient overall.
            let covering = standby
                .iter()
                .filter(|e| deficit >= e.optimal_threshold && deficit <= e.max_capacity)
                .max_by(|a, b| a.efficiency.total_cmp(&b.efficiency));
            let pick = covering
                .or_else(|| standby.iter().max_by(|a, b| a.efficiency.total_cmp(&b.efficiency)));
            if let Some(engine) = pick {
                out.push(Instruction {
                    title: format!("Start {}", engine.name),
                    description: format!(
                        "Demand exceeds production by {deficit:.0} kWh. Start {} to cover \
                         the deficit.",
                        engine.name
                    ),
                    priority: Priority::High,
                    kind: InstructionKind::Immediate,
                    engine_id: Some(engine.id),
                    action: Some("startEngine".to_string()),
                });
            }
        } else if battery_level > 20.0 {
            out.push(Instruction {
                title: "Discharge battery".to_string(),
                description: format!(
                    "Production is {deficit:.0} kWh short of demand. Use battery storage to \
                     bridge the gap."
                ),
                priority: Priority::Medium,
                kind: InstructionKind::Immediate,
                engine_id: None,
                action: Some("useStorage".to_string()),
            });
        }
    } else if balance > SURPLUS_MARGIN_KWH {
        let least_loaded = engines
            .iter()
            .filter(|e| e.is_running)
            .min_by(|a, b| a.load_ratio().total_cmp(&b.load_ratio()));
        if let Some(engine) = least_loaded {
            out.push(Instruction {
                title: format!("Shut down {}", engine.name),
                description: format!(
                    "Production exceeds demand by {balance:.0} kWh. Shut down {} to save fuel.",
                    engine.name
                ),
                priority: Priority::Medium,
                kind: InstructionKind::Immediate,
                engine_id: Some(engine.id),
                action: Some("shutDown".to_string()),
            });
        } else if battery_level < 90.0 {
            out.push(Instruction {
                title: "Charge battery".to_string(),
                description: format!(
                    "Surplus of {balance:.0} kWh available. Store excess energy in the battery."
                ),
                priority: Priority::Medium,
                kind: InstructionKind::Immediate,
                engine_id: None,
                action: Some("chargeStorage".to_string()),
            });
        }
    }

    // Per-engine load checks, in fleet order.
    for engine in engines.iter().filter(|e| e.is_running) {
        if engine.current_output < engine.optimal_threshold * 0.8 {
            let priority = if engine.current_output < engine.optimal_threshold * 0.6 {
                Priority::High
            } else {
                Priority::Medium
            };
            out.push(Instruction {
                title: format!("Optimize {}", engine.name),
                description: format!(
                    "{} is running at {:.0} kWh, well below its optimal {:.0} kWh. Raise its \
                     load or shut it down.",
                    engine.name, engine.current_output, engine.optimal_threshold
                ),
                priority,
                kind: InstructionKind::Immediate,
                engine_id: Some(engine.id),
                action: Some("optimizeOrShutdown".to_string()),
            });
        } else if engine.current_output > engine.max_capacity * 0.95 {
            out.push(Instruction {
                title: format!("Reduce load on {}", engine.name),
                description: format!(
                    "{} is running at {:.0} kWh, close to its {:.0} kWh capacity limit.",
                    engine.name, engine.current_output, engine.max_capacity
                ),
                priority: Priority::High,
                kind: InstructionKind::Immediate,
                engine_id: Some(engine.id),
                action: None,
            });
        }
    }

    out
}

fn forecast_instructions(
    forecast_solar: &[f64],
    forecast_demand: &[f64],
    current_solar: f64,
    current_demand: f64,
    current_day: u8,
    current_hour: u8,
) -> Vec<ForecastInstruction> {
    let mut out = Vec::new();
    let steps = forecast_solar
        .len()
        .min(forecast_demand.len())
        .min(FORECAST_HORIZON);

    for i in 0..steps {
        let ahead = current_hour as u32 + i as u32 + 1;
        let hour = (ahead % 24) as u8;
        let day = current_day + (ahead / 24) as u8;

        let solar = forecast_solar[i];
        let demand = forecast_demand[i];
        let hour_balance = solar - demand;

        if hour_balance < -50.0 {
            let priority = if -hour_balance > 100.0 {
                Priority::High
            } else {
                Priority::Medium
            };
            out.push(ForecastInstruction {
                day,
                hour,
                title: "Prepare for increased demand".to_string(),
                description: format!(
                    "At {hour}:00 demand is forecast to exceed solar by {:.0} kWh. Plan engine \
                     capacity accordingly.",
                    -hour_balance
                ),
                priority,
                engine_id: None,
                action: None,
            });
        } else if hour_balance > 100.0 {
            out.push(ForecastInstruction {
                day,
                hour,
                title: "Prepare for reduced engine load".to_string(),
                description: format!(
                    "At {hour}:00 solar is forecast to exceed demand by {hour_balance:.0} kWh. \
                     Engine output can be scaled back."
                ),
                priority: Priority::Medium,
                engine_id: None,
                action: None,
            });
        }

        if solar > current_solar * 1.5 && solar > 300.0 {
            out.push(ForecastInstruction {
                day,
                hour,
                title: "Solar peak predicted".to_string(),
                description: format!(
                    "Solar output is forecast to reach {solar:.0} kWh at {hour}:00. Consider \
                     charging storage and idling engines."
                ),
                priority: Priority::Medium,
                engine_id: None,
                action: Some("chargeStorage".to_string()),
            });
        }

        if demand > current_demand * 1.3 && demand > 500.0 {
            out.push(ForecastInstruction {
                day,
                hour,
                title: "Demand peak predicted".to_string(),
                description: format!(
                    "Demand is forecast to reach {demand:.0} kWh at {hour}:00. Ensure enough \
                     engine capacity is online."
                ),
                priority: Priority::High,
                engine_id: None,
                action: None,
            });
        }
    }

    out
}
