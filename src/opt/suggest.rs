//! Optimization suggestion generator.
//!
//! Examines one (engines, solar, demand) snapshot and emits a list of
//! suggestions in rule-check order. Every rule is evaluated independently,
//! so a snapshot can trigger zero, one, or many suggestions.

use serde::{Deserialize, Serialize};

use crate::grid::{Engine, types::running_output};
use crate::opt::fuel::DEFAULT_FUEL_PRICE_PER_LITER;

/// Overproduction above demand (kWh) before a shutdown is suggested.
const OVERPRODUCTION_MARGIN_KWH: f64 = 20.0;
/// Fraction below optimal threshold before an engine is flagged.
const BELOW_THRESHOLD_TOLERANCE: f64 = 0.10;

/// Action a suggestion asks the caller to take, as a closed enum rather than
/// the free-form string tokens of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestedAction {
    ShutDown,
    OptimizeOrShutdown,
    StartEngine,
    ChargeStorage,
    UseStorage,
    PlanForWeather,
}

/// Forecast signal replacing the original inline weather randomness.
///
/// Supplied by the caller; `Clear` triggers the plan-for-weather suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeatherOutlook {
    Clear,
    Cloudy,
}

/// One optimization suggestion for the current snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSuggestion {
    /// Short headline.
    pub suggestion: String,
    /// Human-readable explanation with concrete figures.
    pub details: String,
    /// Engine the action applies to, when engine-specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_id: Option<u32>,
    /// Action token for the caller to apply.
    pub suggested_action: SuggestedAction,
    /// Estimated savings in currency per hour, when quantifiable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_savings: Option<f64>,
}

/// Optional battery state for the storage rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageSnapshot {
    /// Fill level as a fraction (0-1).
    pub level: f64,
    /// Battery capacity in kWh; 0 disables the storage rules.
    pub capacity: f64,
}

/// Generates optimization suggestions for the given snapshot.
///
/// Output order is the rule-check order; no severity sort is applied.
///
/// # Arguments
///
/// * `engines` - Full fleet, running and standby
/// * `solar` - Current solar production (kWh)
/// * `demand` - Current demand (kWh)
/// * `storage` - Battery level/capacity, if a battery exists
/// * `outlook` - Optional weather forecast signal
pub fn generate_suggestions(
    engines: &[Engine],
    solar: f64,
    demand: f64,
    storage: Option<StorageSnapshot>,
    outlook: Option<WeatherOutlook>,
) -> Vec<OptimizationSuggestion> {
    let mut suggestions = Vec::new();
    let running: Vec<&Engine> = engines.iter().filter(|e| e.is_running).collect();

    // Rule 1: overproduction. Shut down the running engine with the worst
    // output/capacity ratio.
    let overproduction = running_output(engines) + solar - demand;
    if overproduction > OVERPRODUCTION_MARGIN_KWH {
        let least_loaded = running
            .iter()
            .min_by(|a, b| a.load_ratio().total_cmp(&b.load_ratio()));
        if let Some(engine) = least_loaded {
            let fuel_saving = if engine.efficiency > 0.0 {
                engine.current_output / engine.efficiency
            } else {
                0.0
            };
            suggestions.push(OptimizationSuggestion {
                suggestion: "Reduce overproduction".to_string(),
                details: format!(
                    "System is producing {overproduction:.0} kWh more than needed. \
                     Consider shutting down {}.",
                    engine.name
                ),
                engine_id: Some(engine.id),
                suggested_action: SuggestedAction::ShutDown,
                potential_savings: Some(fuel_saving * DEFAULT_FUEL_PRICE_PER_LITER),
            });
        }
    }

    // Rule 2: running engines significantly below their optimal threshold.
    for engine in &running {
        if engine.optimal_threshold <= 0.0 || engine.current_output >= engine.optimal_threshold {
            continue;
        }
        let below = (engine.optimal_threshold - engine.current_output) / engine.optimal_threshold;
        if below > BELOW_THRESHOLD_TOLERANCE {
            suggestions.push(OptimizationSuggestion {
                suggestion: format!("{} below optimal threshold", engine.name),
                details: format!(
                    "Running at {:.0} kWh (optimal: {:.0} kWh). Increase load or shut down \
                     for better efficiency.",
                    engine.current_output, engine.optimal_threshold
                ),
                engine_id: Some(engine.id),
                suggested_action: SuggestedAction::OptimizeOrShutdown,
                potential_savings: None,
            });
        }
    }

    // Rule 3: a standby engine that could replace two or more running engines
    // with strictly worse fuel efficiency.
    for standby in engines.iter().filter(|e| !e.is_running) {
        let worse: Vec<&&Engine> = running
            .iter()
            .filter(|e| e.efficiency < standby.efficiency)
            .collect();
        if worse.len() < 2 {
            continue;
        }
        let combined: f64 = worse.iter().map(|e| e.current_output).sum();
        if combined >= standby.optimal_threshold && combined <= standby.max_capacity {
            suggestions.push(OptimizationSuggestion {
                suggestion: format!("Start more efficient engine {}", standby.name),
                details: format!(
                    "Replace {} less efficient engines with {} for better fuel economy.",
                    worse.len(),
                    standby.name
                ),
                engine_id: Some(standby.id),
                suggested_action: SuggestedAction::StartEngine,
                potential_savings: None,
            });
        }
    }

    // Rules 4 and 5: battery utilization, only when a battery exists.
    if let Some(bat) = storage.filter(|b| b.capacity > 0.0) {
        if solar > demand * 0.5 && bat.level < 0.9 {
            suggestions.push(OptimizationSuggestion {
                suggestion: "Store excess solar energy".to_string(),
                details: "High solar production detected. Store excess energy in battery \
                          for later use."
                    .to_string(),
                engine_id: None,
                suggested_action: SuggestedAction::ChargeStorage,
                potential_savings: None,
            });
        }
        if solar < demand * 0.2 && bat.level > 0.3 {
            suggestions.push(OptimizationSuggestion {
                suggestion: "Use battery storage".to_string(),
                details: "Low solar production. Discharge battery to reduce engine load."
                    .to_string(),
                engine_id: None,
                suggested_action: SuggestedAction::UseStorage,
                potential_savings: None,
            });
        }
    }

    // Rule 6: weather opportunity, driven by the injected outlook.
    if outlook == Some(WeatherOutlook::Clear) {
        suggestions.push(OptimizationSuggestion {
            suggestion: "Possible solar output increase".to_string(),
            details: "Weather forecast predicts clear skies tomorrow. Reduce scheduled \
                      engine usage from 8:00-16:00."
                .to_string(),
            engine_id: None,
            suggested_action: SuggestedAction::PlanForWeather,
            potential_savings: None,
        });
    }

    suggestions
}
