//! Drives the grid over the configured horizon.
//!
//! Each simulated hour the runner reads the (day, hour) snapshot from the
//! store, dispatches the fleet, regenerates suggestions and instructions,
//! and records the hourly energy and fuel figures.

use std::fmt;

use crate::config::ScenarioConfig;
use crate::grid::{EnergyStorage, SimClock};
use crate::grid::profile::ProfileParams;
use crate::opt::fuel::{carbon_emissions, economic_impact, fuel_consumption, fuel_cost};
use crate::opt::instruct::{FORECAST_HORIZON, generate_instructions};
use crate::opt::suggest::{StorageSnapshot, WeatherOutlook, generate_suggestions};
use crate::opt::{EconomicImpact, allocate_output};
use crate::store::{EngineUpdate, MemStore, NewEngine, Repository};

/// Complete record of one simulated hour.
#[derive(Debug, Clone)]
pub struct HourRecord {
    /// Simulation day (1-7).
    pub day: u8,
    /// Hour of day (0-23).
    pub hour: u8,
    /// Solar production (kWh).
    pub solar_kwh: f64,
    /// Demand (kWh).
    pub demand_kwh: f64,
    /// Dispatched engine output (kWh).
    pub engine_kwh: f64,
    /// Energy balance: engines + solar - demand (kWh).
    pub balance_kwh: f64,
    /// Diesel burned this hour (liters).
    pub fuel_liters: f64,
    /// Fuel cost this hour.
    pub fuel_cost: f64,
    /// CO2 emitted this hour (kg).
    pub co2_kg: f64,
    /// Number of active optimization suggestions after this hour.
    pub suggestion_count: usize,
    /// Number of current-hour dispatch instructions.
    pub instruction_count: usize,
}

impl fmt::Display for HourRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "d{} {:>2}:00 | solar={:>5.0} kWh  demand={:>5.0} kWh  engines={:>5.0} kWh  \
             balance={:>6.0} kWh | fuel={:>6.1} L  cost={:>7.2}  co2={:>7.1} kg | \
             suggestions={} instructions={}",
            self.day,
            self.hour,
            self.solar_kwh,
            self.demand_kwh,
            self.engine_kwh,
            self.balance_kwh,
            self.fuel_liters,
            self.fuel_cost,
            self.co2_kg,
            self.suggestion_count,
            self.instruction_count,
        )
    }
}

/// Aggregate report over a complete run, computed post-hoc from the hour
/// records so the summary always matches the per-hour data.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Total diesel burned (liters).
    pub total_fuel_liters: f64,
    /// Total fuel cost.
    pub total_fuel_cost: f64,
    /// Total CO2 emitted (kg).
    pub total_co2_kg: f64,
    /// Total solar production (kWh).
    pub total_solar_kwh: f64,
    /// Total demand (kWh).
    pub total_demand_kwh: f64,
    /// Total engine output (kWh).
    pub total_engine_kwh: f64,
    /// Hours where the grid ran a deficit beyond 20 kWh.
    pub deficit_hours: usize,
    /// Hours where the grid overproduced beyond 20 kWh.
    pub surplus_hours: usize,
    /// Counterfactual savings from the solar contribution.
    pub solar_impact: EconomicImpact,
}

impl RunReport {
    /// Computes the report from the complete run record.
    ///
    /// `avg_engine_efficiency` is the fleet's mean rated efficiency, used for
    /// the solar substitution counterfactual.
    pub fn from_records(
        records: &[HourRecord],
        avg_engine_efficiency: f64,
        fuel_price: f64,
    ) -> Self {
        let mut total_fuel = 0.0;
        let mut total_cost = 0.0;
        let mut total_co2 = 0.0;
        let mut total_solar = 0.0;
        let mut total_demand = 0.0;
        let mut total_engine = 0.0;
        let mut deficit_hours = 0;
        let mut surplus_hours = 0;

        for r in records {
            total_fuel += r.fuel_liters;
            total_cost += r.fuel_cost;
            total_co2 += r.co2_kg;
            total_solar += r.solar_kwh;
            total_demand += r.demand_kwh;
            total_engine += r.engine_kwh;
            if r.balance_kwh < -20.0 {
                deficit_hours += 1;
            } else if r.balance_kwh > 20.0 {
                surplus_hours += 1;
            }
        }

        Self {
            total_fuel_liters: total_fuel,
            total_fuel_cost: total_cost,
            total_co2_kg: total_co2,
            total_solar_kwh: total_solar,
            total_demand_kwh: total_demand,
            total_engine_kwh: total_engine,
            deficit_hours,
            surplus_hours,
            solar_impact: economic_impact(total_solar, avg_engine_efficiency, fuel_price),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Report ---")?;
        writeln!(f, "Demand served:      {:.0} kWh", self.total_demand_kwh)?;
        writeln!(f, "Engine output:      {:.0} kWh", self.total_engine_kwh)?;
        writeln!(f, "Solar production:   {:.0} kWh", self.total_solar_kwh)?;
        writeln!(f, "Fuel burned:        {:.1} L", self.total_fuel_liters)?;
        writeln!(f, "Fuel cost:          {:.2}", self.total_fuel_cost)?;
        writeln!(f, "CO2 emitted:        {:.1} kg", self.total_co2_kg)?;
        writeln!(
            f,
            "Solar offset:       {:.1} L fuel, {:.2} cost, {:.1} kg CO2",
            self.solar_impact.fuel_saved,
            self.solar_impact.cost_reduction,
            self.solar_impact.carbon_offset
        )?;
        write!(
            f,
            "Imbalanced hours:   {} deficit, {} surplus",
            self.deficit_hours, self.surplus_hours
        )
    }
}

/// Builds a seeded store from a scenario configuration.
pub fn build_store(cfg: &ScenarioConfig) -> MemStore {
    let clock = SimClock::new(cfg.simulation.start_day, cfg.simulation.start_hour);
    let mut store = MemStore::new(clock, cfg.simulation.engines_start_running);

    if cfg.battery.max_capacity > 0.0 {
        store.set_storage(EnergyStorage {
            max_capacity: cfg.battery.max_capacity,
            current_charge: cfg.battery.initial_charge,
            charge_efficiency: cfg.battery.charge_efficiency,
            discharge_efficiency: cfg.battery.discharge_efficiency,
        });
    }

    let params = ProfileParams {
        solar_scale: cfg.profile.solar_scale,
        demand_scale: cfg.profile.demand_scale,
        weekend_factor: cfg.profile.weekend_factor,
    };
    store.seed_profiles(&params, cfg.simulation.seed);

    for e in &cfg.engines {
        store.create_engine(NewEngine {
            name: e.name.clone(),
            max_capacity: e.max_capacity,
            efficiency: e.efficiency,
            optimal_threshold: e.optimal_threshold,
        });
    }

    store
}

/// Deterministic weather hook: tomorrow's noon record decides the outlook
/// supplied to the suggestion generator.
pub fn weather_outlook(store: &impl Repository, day: u8) -> Option<WeatherOutlook> {
    store.solar_by_period(day + 1, 12).map(|r| {
        if r.weather == "Sunny" {
            WeatherOutlook::Clear
        } else {
            WeatherOutlook::Cloudy
        }
    })
}

/// Walks the clock over the configured horizon against a [`MemStore`].
pub struct Runner {
    store: MemStore,
    fuel_price: f64,
}

impl Runner {
    /// Builds a runner (and its store) from a scenario.
    pub fn new(cfg: &ScenarioConfig) -> Self {
        Self {
            store: build_store(cfg),
            fuel_price: cfg.fuel.price_per_liter,
        }
    }

    /// Simulates one hour at the current clock position, then advances.
    pub fn step(&mut self) -> HourRecord {
        let clock = self.store.clock();
        let solar = self
            .store
            .solar_by_period(clock.day, clock.hour)
            .map(|r| r.output)
            .unwrap_or(0.0);
        let demand = self
            .store
            .consumption_by_period(clock.day, clock.hour)
            .map(|r| r.demand)
            .unwrap_or(0.0);

        // Dispatch the running fleet against demand net of solar.
        let engines = self.store.engines();
        for allocation in allocate_output(&engines, demand, solar) {
            self.store.update_engine(
                allocation.id,
                EngineUpdate {
                    current_output: Some(allocation.output),
                    ..EngineUpdate::default()
                },
            );
        }
        let engines = self.store.engines();

        let fuel_liters = fuel_consumption(&engines);
        let engine_kwh: f64 = engines
            .iter()
            .filter(|e| e.is_running)
            .map(|e| e.current_output)
            .sum();
        let balance_kwh = engine_kwh + solar - demand;

        // Regenerate the suggestion set for the new snapshot.
        let storage = self.store.storage();
        let snapshot = storage.as_ref().map(|s| StorageSnapshot {
            level: s.level(),
            capacity: s.max_capacity,
        });
        let outlook = weather_outlook(&self.store, clock.day);
        let suggestions = generate_suggestions(&engines, solar, demand, snapshot, outlook);
        let suggestion_count = suggestions.len();
        self.store
            .replace_suggestions(clock.day, clock.hour, suggestions);

        // Forecast window for the instruction generator.
        let mut forecast_solar = Vec::with_capacity(FORECAST_HORIZON);
        let mut forecast_demand = Vec::with_capacity(FORECAST_HORIZON);
        for i in 0..FORECAST_HORIZON as u8 {
            let (day, hour) = clock.forecast_slot(i + 1);
            forecast_solar.push(
                self.store
                    .solar_by_period(day, hour)
                    .map(|r| r.output)
                    .unwrap_or(0.0),
            );
            forecast_demand.push(
                self.store
                    .consumption_by_period(day, hour)
                    .map(|r| r.demand)
                    .unwrap_or(0.0),
            );
        }
        let battery_level = storage.as_ref().map(|s| s.level_percent()).unwrap_or(50.0);
        let instructions = generate_instructions(
            &engines,
            solar,
            demand,
            &forecast_solar,
            &forecast_demand,
            clock.day,
            clock.hour,
            battery_level,
        );

        let record = HourRecord {
            day: clock.day,
            hour: clock.hour,
            solar_kwh: solar,
            demand_kwh: demand,
            engine_kwh,
            balance_kwh,
            fuel_liters,
            fuel_cost: fuel_cost(fuel_liters, self.fuel_price),
            co2_kg: carbon_emissions(fuel_liters),
            suggestion_count,
            instruction_count: instructions.current_instructions.len(),
        };

        self.store.advance_clock();
        record
    }

    /// Runs the given number of hours and returns the complete record.
    pub fn run(&mut self, hours: u32) -> Vec<HourRecord> {
        let mut records = Vec::with_capacity(hours as usize);
        for _ in 0..hours {
            records.push(self.step());
        }
        records
    }

    /// Mean rated efficiency of the fleet, 4.0 kWh/L for an empty fleet.
    pub fn avg_engine_efficiency(&self) -> f64 {
        let engines = self.store.engines();
        if engines.is_empty() {
            return 4.0;
        }
        engines.iter().map(|e| e.efficiency).sum::<f64>() / engines.len() as f64
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &MemStore {
        &self.store
    }

    /// Consumes the runner, yielding the store for further use (API serving).
    pub fn into_store(self) -> MemStore {
        self.store
    }
}
