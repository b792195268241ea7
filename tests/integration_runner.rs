//! Integration tests for full scenario runs.

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::io::export::write_csv;
use microgrid_sim::runner::{RunReport, Runner, build_store};
use microgrid_sim::store::Repository;

#[test]
fn baseline_run_covers_demand_every_hour() {
    let cfg = ScenarioConfig::baseline();
    let mut runner = Runner::new(&cfg);
    let records = runner.run(cfg.simulation.hours);

    assert_eq!(records.len(), 24);
    for r in &records {
        assert!(
            r.balance_kwh >= -1e-9,
            "unserved demand at day {} hour {}: {}",
            r.day,
            r.hour,
            r.balance_kwh
        );
        assert!(r.fuel_liters >= 0.0);
        assert!(r.demand_kwh >= 0.0);
    }
}

#[test]
fn night_shift_wraps_the_week() {
    let cfg = ScenarioConfig::night_shift();
    let mut runner = Runner::new(&cfg);
    let records = runner.run(cfg.simulation.hours);

    assert_eq!(records.len(), 168);
    assert_eq!((records[0].day, records[0].hour), (1, 20));
    // Starting at day 1 20:00, step 28 lands on day 3 00:00.
    assert_eq!((records[28].day, records[28].hour), (3, 0));
    // The final record is one hour before the start slot, a week later.
    assert_eq!((records[167].day, records[167].hour), (1, 19));
}

#[test]
fn solar_heavy_burns_less_fuel_than_baseline() {
    let base = Runner::new(&ScenarioConfig::baseline()).run(24);
    let heavy = Runner::new(&ScenarioConfig::solar_heavy()).run(24);

    let base_solar: f64 = base.iter().map(|r| r.solar_kwh).sum();
    let heavy_solar: f64 = heavy.iter().map(|r| r.solar_kwh).sum();
    assert!(heavy_solar > base_solar * 1.3);

    let base_fuel: f64 = base.iter().map(|r| r.fuel_liters).sum();
    let heavy_fuel: f64 = heavy.iter().map(|r| r.fuel_liters).sum();
    assert!(heavy_fuel < base_fuel);
}

#[test]
fn seed_override_changes_profiles() {
    let mut cfg = ScenarioConfig::baseline();
    let a = Runner::new(&cfg).run(24);
    cfg.simulation.seed = 7;
    let b = Runner::new(&cfg).run(24);

    assert!(a.iter().zip(&b).any(|(x, y)| x.demand_kwh != y.demand_kwh));
}

#[test]
fn store_is_seeded_with_a_full_week() {
    let cfg = ScenarioConfig::baseline();
    let store = build_store(&cfg);

    for day in 1..=7 {
        assert_eq!(store.daily_solar(day).len(), 24);
        assert_eq!(store.daily_consumption(day).len(), 24);
    }
    assert_eq!(store.engines().len(), 3);
    assert!(store.storage().is_some());
}

#[test]
fn run_then_export_produces_one_row_per_hour() {
    let cfg = ScenarioConfig::baseline();
    let mut runner = Runner::new(&cfg);
    let records = runner.run(24);

    let mut buf = Vec::new();
    write_csv(&records, &mut buf).expect("in-memory export should succeed");
    let text = String::from_utf8(buf).expect("CSV is UTF-8");
    assert_eq!(text.lines().count(), 25);
    assert!(text.lines().nth(1).unwrap_or("").starts_with("1,8,"));
}

#[test]
fn report_display_mentions_all_totals() {
    let cfg = ScenarioConfig::baseline();
    let mut runner = Runner::new(&cfg);
    let records = runner.run(24);
    let report = RunReport::from_records(&records, runner.avg_engine_efficiency(), 1.5);

    let text = report.to_string();
    assert!(text.contains("Fuel burned:"));
    assert!(text.contains("Solar production:"));
    assert!(text.contains("CO2 emitted:"));
    assert!(text.contains("Imbalanced hours:"));
}
