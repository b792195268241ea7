//! In-memory grid state store.
//!
//! The optimization core is a pure-function library; this store is the
//! collaborator that owns engines, weekly solar/consumption signals, the
//! battery, the clock, and the suggestion lifecycle. Lookups by (day, hour)
//! and by record id are separate, typed methods.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grid::profile::{ProfileParams, generate_consumption, generate_solar};
use crate::grid::{ConsumptionRecord, EnergyStorage, Engine, SimClock, SolarRecord};
use crate::opt::suggest::{OptimizationSuggestion, SuggestedAction};

/// Parameters for creating an engine; id and runtime state are assigned by
/// the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEngine {
    pub name: String,
    pub max_capacity: f64,
    pub efficiency: f64,
    pub optimal_threshold: f64,
}

/// Partial engine update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineUpdate {
    pub name: Option<String>,
    pub max_capacity: Option<f64>,
    pub efficiency: Option<f64>,
    pub optimal_threshold: Option<f64>,
    pub is_running: Option<bool>,
    pub current_output: Option<f64>,
}

/// A suggestion persisted with its snapshot position and lifecycle flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSuggestion {
    pub id: u32,
    pub day: u8,
    pub hour: u8,
    #[serde(flatten)]
    pub body: OptimizationSuggestion,
    pub applied: bool,
}

/// Storage surface the optimization callers are written against.
///
/// The core itself never touches this; only the runner and the API layer do.
pub trait Repository {
    fn engines(&self) -> Vec<Engine>;
    fn engine(&self, id: u32) -> Option<Engine>;
    fn create_engine(&mut self, new: NewEngine) -> Engine;
    fn update_engine(&mut self, id: u32, update: EngineUpdate) -> Option<Engine>;
    fn delete_engine(&mut self, id: u32) -> bool;

    /// Solar record for a (day, hour) slot.
    fn solar_by_period(&self, day: u8, hour: u8) -> Option<SolarRecord>;
    /// Solar record by store id.
    fn solar_by_id(&self, id: u32) -> Option<SolarRecord>;
    fn set_solar_output(&mut self, id: u32, output: f64) -> Option<SolarRecord>;

    /// Consumption record for a (day, hour) slot.
    fn consumption_by_period(&self, day: u8, hour: u8) -> Option<ConsumptionRecord>;
    /// Consumption record by store id.
    fn consumption_by_id(&self, id: u32) -> Option<ConsumptionRecord>;
    fn set_consumption_demand(&mut self, id: u32, demand: f64) -> Option<ConsumptionRecord>;

    fn storage(&self) -> Option<EnergyStorage>;
    fn clock(&self) -> SimClock;
    fn advance_clock(&mut self) -> SimClock;

    /// Unapplied suggestions, highest potential savings first.
    fn suggestions(&self) -> Vec<StoredSuggestion>;
    /// Drops unapplied suggestions and stores a fresh set for the snapshot.
    fn replace_suggestions(&mut self, day: u8, hour: u8, items: Vec<OptimizationSuggestion>);
    /// Marks a suggestion applied and mutates the referenced engine.
    fn apply_suggestion(&mut self, id: u32) -> Option<StoredSuggestion>;
}

/// Single-process, in-memory implementation of [`Repository`].
#[derive(Debug, Clone)]
pub struct MemStore {
    engines: BTreeMap<u32, Engine>,
    solar: BTreeMap<u32, SolarRecord>,
    consumption: BTreeMap<u32, ConsumptionRecord>,
    storage: Option<EnergyStorage>,
    clock: SimClock,
    suggestions: BTreeMap<u32, StoredSuggestion>,
    engines_start_running: bool,
    next_engine_id: u32,
    next_solar_id: u32,
    next_consumption_id: u32,
    next_suggestion_id: u32,
}

impl MemStore {
    /// Creates an empty store with the given clock position.
    ///
    /// `engines_start_running` resolves whether freshly created engines come
    /// up dispatched or on standby.
    pub fn new(clock: SimClock, engines_start_running: bool) -> Self {
        Self {
            engines: BTreeMap::new(),
            solar: BTreeMap::new(),
            consumption: BTreeMap::new(),
            storage: None,
            clock,
            suggestions: BTreeMap::new(),
            engines_start_running,
            next_engine_id: 1,
            next_solar_id: 1,
            next_consumption_id: 1,
            next_suggestion_id: 1,
        }
    }

    /// Installs the battery instance (a single logical unit per grid).
    pub fn set_storage(&mut self, storage: EnergyStorage) {
        self.storage = Some(storage);
    }

    /// Seeds the weekly solar and consumption profiles procedurally.
    pub fn seed_profiles(&mut self, params: &ProfileParams, seed: u64) {
        for slot in generate_solar(params, seed) {
            let id = self.next_solar_id;
            self.next_solar_id += 1;
            self.solar.insert(
                id,
                SolarRecord {
                    id,
                    day: slot.day,
                    hour: slot.hour,
                    output: slot.value,
                    weather: slot.tag,
                },
            );
        }
        // Offset the seed so the demand draw is not correlated with solar.
        for slot in generate_consumption(params, seed.wrapping_add(101)) {
            let id = self.next_consumption_id;
            self.next_consumption_id += 1;
            self.consumption.insert(
                id,
                ConsumptionRecord {
                    id,
                    day: slot.day,
                    hour: slot.hour,
                    demand: slot.value,
                    source: slot.tag,
                },
            );
        }
    }

    /// All solar records for one day, hour ascending.
    pub fn daily_solar(&self, day: u8) -> Vec<SolarRecord> {
        let mut records: Vec<SolarRecord> = self
            .solar
            .values()
            .filter(|r| r.day == day)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.hour);
        records
    }

    /// All consumption records for one day, hour ascending.
    pub fn daily_consumption(&self, day: u8) -> Vec<ConsumptionRecord> {
        let mut records: Vec<ConsumptionRecord> = self
            .consumption
            .values()
            .filter(|r| r.day == day)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.hour);
        records
    }
}

impl Repository for MemStore {
    fn engines(&self) -> Vec<Engine> {
        self.engines.values().cloned().collect()
    }

    fn engine(&self, id: u32) -> Option<Engine> {
        self.engines.get(&id).cloned()
    }

    fn create_engine(&mut self, new: NewEngine) -> Engine {
        let id = self.next_engine_id;
        self.next_engine_id += 1;
        let engine = Engine {
            id,
            name: new.name,
            max_capacity: new.max_capacity,
            efficiency: new.efficiency,
            optimal_threshold: new.optimal_threshold,
            is_running: self.engines_start_running,
            current_output: 0.0,
        };
        self.engines.insert(id, engine.clone());
        engine
    }

    fn update_engine(&mut self, id: u32, update: EngineUpdate) -> Option<Engine> {
        let engine = self.engines.get_mut(&id)?;
        if let Some(name) = update.name {
            engine.name = name;
        }
        if let Some(v) = update.max_capacity {
            engine.max_capacity = v;
        }
        if let Some(v) = update.efficiency {
            engine.efficiency = v;
        }
        if let Some(v) = update.optimal_threshold {
            engine.optimal_threshold = v;
        }
        if let Some(v) = update.is_running {
            engine.is_running = v;
            if !v {
                engine.current_output = 0.0;
            }
        }
        if let Some(v) = update.current_output {
            engine.current_output = v;
        }
        Some(engine.clone())
    }

    fn delete_engine(&mut self, id: u32) -> bool {
        self.engines.remove(&id).is_some()
    }

    fn solar_by_period(&self, day: u8, hour: u8) -> Option<SolarRecord> {
        self.solar
            .values()
            .find(|r| r.day == day && r.hour == hour)
            .cloned()
    }

    fn solar_by_id(&self, id: u32) -> Option<SolarRecord> {
        self.solar.get(&id).cloned()
    }

    fn set_solar_output(&mut self, id: u32, output: f64) -> Option<SolarRecord> {
        let record = self.solar.get_mut(&id)?;
        record.output = output;
        Some(record.clone())
    }

    fn consumption_by_period(&self, day: u8, hour: u8) -> Option<ConsumptionRecord> {
        self.consumption
            .values()
            .find(|r| r.day == day && r.hour == hour)
            .cloned()
    }

    fn consumption_by_id(&self, id: u32) -> Option<ConsumptionRecord> {
        self.consumption.get(&id).cloned()
    }

    fn set_consumption_demand(&mut self, id: u32, demand: f64) -> Option<ConsumptionRecord> {
        let record = self.consumption.get_mut(&id)?;
        record.demand = demand;
        Some(record.clone())
    }

    fn storage(&self) -> Option<EnergyStorage> {
        self.storage.clone()
    }

    fn clock(&self) -> SimClock {
        self.clock
    }

    fn advance_clock(&mut self) -> SimClock {
        self.clock.advance();
        self.clock
    }

    fn suggestions(&self) -> Vec<StoredSuggestion> {
        let mut out: Vec<StoredSuggestion> = self
            .suggestions
            .values()
            .filter(|s| !s.applied)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            let sa = a.body.potential_savings.unwrap_or(0.0);
            let sb = b.body.potential_savings.unwrap_or(0.0);
            sb.total_cmp(&sa)
        });
        out
    }

    fn replace_suggestions(&mut self, day: u8, hour: u8, items: Vec<OptimizationSuggestion>) {
        self.suggestions.retain(|_, s| s.applied);
        for body in items {
            let id = self.next_suggestion_id;
            self.next_suggestion_id += 1;
            self.suggestions.insert(
                id,
                StoredSuggestion {
                    id,
                    day,
                    hour,
                    body,
                    applied: false,
                },
            );
        }
    }

    fn apply_suggestion(&mut self, id: u32) -> Option<StoredSuggestion> {
        let suggestion = self.suggestions.get_mut(&id)?;
        suggestion.applied = true;
        let applied = suggestion.clone();

        if let Some(engine_id) = applied.body.engine_id {
            if let Some(engine) = self.engines.get(&engine_id).cloned() {
                match applied.body.suggested_action {
                    SuggestedAction::ShutDown => {
                        self.update_engine(
                            engine_id,
                            EngineUpdate {
                                is_running: Some(false),
                                current_output: Some(0.0),
                                ..EngineUpdate::default()
                            },
                        );
                    }
                    SuggestedAction::StartEngine => {
                        self.update_engine(
                            engine_id,
                            EngineUpdate {
                                is_running: Some(true),
                                current_output: Some(engine.optimal_threshold),
                                ..EngineUpdate::default()
                            },
                        );
                    }
                    SuggestedAction::OptimizeOrShutdown => {
                        // Raise to the optimal threshold when feasible,
                        // otherwise take the engine offline.
                        if engine.optimal_threshold <= engine.max_capacity {
                            self.update_engine(
                                engine_id,
                                EngineUpdate {
                                    current_output: Some(engine.optimal_threshold),
                                    ..EngineUpdate::default()
                                },
                            );
                        } else {
                            self.update_engine(
                                engine_id,
                                EngineUpdate {
                                    is_running: Some(false),
                                    current_output: Some(0.0),
                                    ..EngineUpdate::default()
                                },
                            );
                        }
                    }
                    _ => {}
                }
            }
        }

        Some(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opt::suggest::generate_suggestions;

    fn store_with_engine(running: bool) -> (MemStore, u32) {
        let mut store = MemStore::new(SimClock::new(1, 8), running);
        let engine = store.create_engine(NewEngine {
            name: "Alpha".to_string(),
            max_capacity: 500.0,
            efficiency: 4.2,
            optimal_threshold: 150.0,
        });
        (store, engine.id)
    }

    #[test]
    fn created_engine_uses_configured_default_state() {
        let (store, id) = store_with_engine(true);
        assert!(store.engine(id).map(|e| e.is_running).unwrap_or(false));

        let (store, id) = store_with_engine(false);
        assert!(!store.engine(id).map(|e| e.is_running).unwrap_or(true));
    }

    #[test]
    fn stopping_an_engine_resets_output() {
        let (mut store, id) = store_with_engine(true);
        store.update_engine(
            id,
            EngineUpdate {
                current_output: Some(300.0),
                ..EngineUpdate::default()
            },
        );
        store.update_engine(
            id,
            EngineUpdate {
                is_running: Some(false),
                ..EngineUpdate::default()
            },
        );
        let engine = store.engine(id).unwrap();
        assert!(!engine.is_running);
        assert_eq!(engine.current_output, 0.0);
    }

    #[test]
    fn period_and_id_lookups_are_distinct() {
        let mut store = MemStore::new(SimClock::new(1, 8), true);
        store.seed_profiles(&ProfileParams::default(), 42);

        let by_period = store.solar_by_period(1, 12).unwrap();
        let by_id = store.solar_by_id(by_period.id).unwrap();
        assert_eq!(by_period, by_id);

        assert!(store.solar_by_period(1, 12).is_some());
        assert!(store.consumption_by_period(7, 23).is_some());
        assert!(store.solar_by_period(8, 0).is_none());
    }

    #[test]
    fn seeded_profiles_cover_the_week() {
        let mut store = MemStore::new(SimClock::new(1, 8), true);
        store.seed_profiles(&ProfileParams::default(), 42);
        assert_eq!(store.daily_solar(1).len(), 24);
        assert_eq!(store.daily_consumption(7).len(), 24);
    }

    #[test]
    fn replace_clears_only_unapplied_suggestions() {
        let (mut store, id) = store_with_engine(true);
        store.update_engine(
            id,
            EngineUpdate {
                current_output: Some(600.0),
                ..EngineUpdate::default()
            },
        );
        let engines = store.engines();
        let fresh = generate_suggestions(&engines, 50.0, 400.0, None, None);
        assert!(!fresh.is_empty());
        store.replace_suggestions(1, 8, fresh);

        let first = store.suggestions()[0].clone();
        store.apply_suggestion(first.id);

        // Regeneration drops unapplied records but keeps the applied one.
        store.replace_suggestions(1, 9, Vec::new());
        assert!(store.suggestions().is_empty());
        assert!(
            store
                .apply_suggestion(first.id)
                .map(|s| s.applied)
                .unwrap_or(false)
        );
    }

    #[test]
    fn applying_shutdown_stops_the_engine() {
        let (mut store, id) = store_with_engine(true);
        store.update_engine(
            id,
            EngineUpdate {
                current_output: Some(600.0),
                ..EngineUpdate::default()
            },
        );
        let engines = store.engines();
        store.replace_suggestions(1, 8, generate_suggestions(&engines, 50.0, 400.0, None, None));

        let shutdown = store
            .suggestions()
            .into_iter()
            .find(|s| s.body.suggested_action == SuggestedAction::ShutDown)
            .unwrap();
        store.apply_suggestion(shutdown.id);

        let engine = store.engine(id).unwrap();
        assert!(!engine.is_running);
        assert_eq!(engine.current_output, 0.0);
    }

    #[test]
    fn applying_start_engine_twice_is_idempotent() {
        let mut store = MemStore::new(SimClock::new(1, 8), false);
        let engine = store.create_engine(NewEngine {
            name: "Gamma".to_string(),
            max_capacity: 650.0,
            efficiency: 5.1,
            optimal_threshold: 200.0,
        });
        let body = OptimizationSuggestion {
            suggestion: "Start more efficient engine Gamma".to_string(),
            details: String::new(),
            engine_id: Some(engine.id),
            suggested_action: SuggestedAction::StartEngine,
            potential_savings: None,
        };
        store.replace_suggestions(1, 8, vec![body.clone()]);
        let first_id = store.suggestions()[0].id;
        store.apply_suggestion(first_id);
        let after_first = store.engine(engine.id).unwrap();
        assert!(after_first.is_running);
        assert_eq!(after_first.current_output, 200.0);

        store.replace_suggestions(1, 8, vec![body]);
        let second_id = store.suggestions()[0].id;
        store.apply_suggestion(second_id);
        let after_second = store.engine(engine.id).unwrap();
        assert_eq!(after_second, after_first);
    }

    #[test]
    fn suggestions_listing_orders_by_savings() {
        let (mut store, id) = store_with_engine(true);
        let cheap = OptimizationSuggestion {
            suggestion: "A".to_string(),
            details: String::new(),
            engine_id: Some(id),
            suggested_action: SuggestedAction::OptimizeOrShutdown,
            potential_savings: Some(10.0),
        };
        let rich = OptimizationSuggestion {
            suggestion: "B".to_string(),
            details: String::new(),
            engine_id: Some(id),
            suggested_action: SuggestedAction::ShutDown,
            potential_savings: Some(90.0),
        };
        store.replace_suggestions(1, 8, vec![cheap, rich]);
        let listed = store.suggestions();
        assert_eq!(listed[0].body.suggestion, "B");
        assert_eq!(listed[1].body.suggestion, "A");
    }

    #[test]
    fn clock_advance_round_trip() {
        let mut store = MemStore::new(SimClock::new(7, 23), true);
        let clock = store.advance_clock();
        assert_eq!((clock.day, clock.hour), (1, 0));
        assert_eq!(store.clock(), clock);
    }
}
