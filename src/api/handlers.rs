//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{AckResponse, ConsumptionPatch, ErrorResponse, SolarPatch, StateResponse};
use crate::grid::{ConsumptionRecord, Engine, SimClock, SolarRecord, energy_balance};
use crate::opt::fuel::economic_impact;
use crate::opt::instruct::{FORECAST_HORIZON, InstructionSet, generate_instructions};
use crate::opt::suggest::{StorageSnapshot, generate_suggestions};
use crate::runner::weather_outlook;
use crate::store::{EngineUpdate, NewEngine, Repository, StoredSuggestion};

type NotFound = (StatusCode, Json<ErrorResponse>);

fn not_found(what: &str, id: u32) -> NotFound {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!("{what} {id} not found"))),
    )
}

/// Mean rated efficiency of the fleet, 4.0 kWh/L for an empty fleet.
fn avg_efficiency(engines: &[Engine]) -> f64 {
    if engines.is_empty() {
        return 4.0;
    }
    engines.iter().map(|e| e.efficiency).sum::<f64>() / engines.len() as f64
}

/// Returns the combined grid snapshot for the current clock position.
///
/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    let store = state.store();
    let clock = store.clock();
    let engines = store.engines();
    let solar = store.solar_by_period(clock.day, clock.hour);
    let consumption = store.consumption_by_period(clock.day, clock.hour);
    let balance = energy_balance(
        &engines,
        solar.as_ref().map(|r| r.output).unwrap_or(0.0),
        consumption.as_ref().map(|r| r.demand).unwrap_or(0.0),
    );

    Json(StateResponse {
        clock,
        engines,
        storage: store.storage(),
        solar,
        consumption,
        balance,
    })
}

/// `GET /engines` → 200 + engine list JSON
pub async fn list_engines(State(state): State<Arc<AppState>>) -> Json<Vec<Engine>> {
    Json(state.store().engines())
}

/// `GET /engines/{id}` → 200 + engine JSON, 404 when unknown
pub async fn get_engine(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<Engine>, NotFound> {
    state
        .store()
        .engine(id)
        .map(Json)
        .ok_or_else(|| not_found("engine", id))
}

/// `POST /engines` → 201 + created engine JSON
pub async fn create_engine(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewEngine>,
) -> impl IntoResponse {
    let engine = state.store().create_engine(new);
    (StatusCode::CREATED, Json(engine))
}

/// `PATCH /engines/{id}` → 200 + updated engine JSON, 404 when unknown
pub async fn update_engine(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
    Json(update): Json<EngineUpdate>,
) -> Result<Json<Engine>, NotFound> {
    state
        .store()
        .update_engine(id, update)
        .map(Json)
        .ok_or_else(|| not_found("engine", id))
}

/// Flips an engine between running and standby. Stopping zeroes the output;
/// starting brings it up at its optimal threshold.
///
/// `POST /engines/{id}/toggle` → 200 + updated engine JSON, 404 when unknown
pub async fn toggle_engine(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<Engine>, NotFound> {
    let mut store = state.store();
    let engine = store.engine(id).ok_or_else(|| not_found("engine", id))?;
    let update = if engine.is_running {
        EngineUpdate {
            is_running: Some(false),
            current_output: Some(0.0),
            ..EngineUpdate::default()
        }
    } else {
        EngineUpdate {
            is_running: Some(true),
            current_output: Some(engine.optimal_threshold),
            ..EngineUpdate::default()
        }
    };
    store
        .update_engine(id, update)
        .map(Json)
        .ok_or_else(|| not_found("engine", id))
}

/// `DELETE /engines/{id}` → 204, 404 when unknown
pub async fn delete_engine(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<StatusCode, NotFound> {
    if state.store().delete_engine(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("engine", id))
    }
}

/// Overrides one solar record, e.g. to replay a measured value.
///
/// `PATCH /solar/{id}` → 200 + updated record JSON, 404 when unknown
pub async fn set_solar(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
    Json(patch): Json<SolarPatch>,
) -> Result<Json<SolarRecord>, NotFound> {
    state
        .store()
        .set_solar_output(id, patch.output)
        .map(Json)
        .ok_or_else(|| not_found("solar record", id))
}

/// Overrides one consumption record.
///
/// `PATCH /consumption/{id}` → 200 + updated record JSON, 404 when unknown
pub async fn set_consumption(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
    Json(patch): Json<ConsumptionPatch>,
) -> Result<Json<ConsumptionRecord>, NotFound> {
    state
        .store()
        .set_consumption_demand(id, patch.demand)
        .map(Json)
        .ok_or_else(|| not_found("consumption record", id))
}

/// `GET /suggestions` → 200 + active suggestions, highest savings first
pub async fn list_suggestions(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<StoredSuggestion>> {
    Json(state.store().suggestions())
}

/// Regenerates the suggestion set for the current snapshot and returns it.
///
/// `POST /suggestions/generate` → 200 + fresh suggestion list
pub async fn generate(State(state): State<Arc<AppState>>) -> Json<Vec<StoredSuggestion>> {
    let mut store = state.store();
    let clock = store.clock();
    let engines = store.engines();
    let solar = store
        .solar_by_period(clock.day, clock.hour)
        .map(|r| r.output)
        .unwrap_or(0.0);
    let demand = store
        .consumption_by_period(clock.day, clock.hour)
        .map(|r| r.demand)
        .unwrap_or(0.0);
    let snapshot = store.storage().map(|s| StorageSnapshot {
        level: s.level(),
        capacity: s.max_capacity,
    });
    let outlook = weather_outlook(&*store, clock.day);

    let fresh = generate_suggestions(&engines, solar, demand, snapshot, outlook);
    store.replace_suggestions(clock.day, clock.hour, fresh);
    Json(store.suggestions())
}

/// Marks a suggestion applied and carries out its engine side effect.
///
/// `POST /suggestions/{id}/apply` → 200 + ack, 404 when unknown
pub async fn apply_suggestion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<AckResponse>, NotFound> {
    state
        .store()
        .apply_suggestion(id)
        .map(|_| {
            Json(AckResponse {
                success: true,
                message: "suggestion applied".to_string(),
            })
        })
        .ok_or_else(|| not_found("suggestion", id))
}

/// Generates dispatch instructions for the current hour plus the six-hour
/// forecast window.
///
/// `GET /instructions` → 200 + `InstructionSet` JSON
pub async fn get_instructions(State(state): State<Arc<AppState>>) -> Json<InstructionSet> {
    let store = state.store();
    let clock = store.clock();
    let engines = store.engines();
    let solar = store
        .solar_by_period(clock.day, clock.hour)
        .map(|r| r.output)
        .unwrap_or(0.0);
    let demand = store
        .consumption_by_period(clock.day, clock.hour)
        .map(|r| r.demand)
        .unwrap_or(0.0);

    let mut forecast_solar = Vec::with_capacity(FORECAST_HORIZON);
    let mut forecast_demand = Vec::with_capacity(FORECAST_HORIZON);
    for i in 0..FORECAST_HORIZON as u8 {
        let (day, hour) = clock.forecast_slot(i + 1);
        forecast_solar.push(
            store
                .solar_by_period(day, hour)
                .map(|r| r.output)
                .unwrap_or(0.0),
        );
        forecast_demand.push(
            store
                .consumption_by_period(day, hour)
                .map(|r| r.demand)
                .unwrap_or(0.0),
        );
    }
    let battery_level = store.storage().map(|s| s.level_percent()).unwrap_or(50.0);

    Json(generate_instructions(
        &engines,
        solar,
        demand,
        &forecast_solar,
        &forecast_demand,
        clock.day,
        clock.hour,
        battery_level,
    ))
}

/// Counterfactual savings from the current day's solar production.
///
/// `GET /impact` → 200 + `EconomicImpact` JSON
pub async fn get_impact(
    State(state): State<Arc<AppState>>,
) -> Json<crate::opt::EconomicImpact> {
    let store = state.store();
    let clock = store.clock();
    let daily_solar: f64 = store
        .daily_solar(clock.day)
        .iter()
        .map(|r| r.output)
        .sum();
    let engines = store.engines();
    Json(economic_impact(
        daily_solar,
        avg_efficiency(&engines),
        state.fuel_price,
    ))
}

/// `POST /clock/advance` → 200 + new clock position
pub async fn advance_clock(State(state): State<Arc<AppState>>) -> Json<SimClock> {
    Json(state.store().advance_clock())
}
