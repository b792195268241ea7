//! Shared test fixtures for integration tests.

use microgrid_sim::grid::Engine;

/// Builds an engine with explicit runtime state.
pub fn engine(
    id: u32,
    name: &str,
    max_capacity: f64,
    efficiency: f64,
    optimal_threshold: f64,
    is_running: bool,
    current_output: f64,
) -> Engine {
    Engine {
        id,
        name: name.to_string(),
        max_capacity,
        efficiency,
        optimal_threshold,
        is_running,
        current_output,
    }
}

/// The three-engine baseline fleet, all running at their optimal threshold.
pub fn baseline_fleet() -> Vec<Engine> {
    vec![
        engine(1, "Engine Alpha", 500.0, 4.2, 150.0, true, 150.0),
        engine(2, "Engine Beta", 350.0, 3.8, 100.0, true, 100.0),
        engine(3, "Engine Gamma", 650.0, 5.1, 200.0, true, 200.0),
    ]
}