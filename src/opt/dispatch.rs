//! Engine output allocation.
//!
//! Distributes demand net of solar across running engines: a first pass
//! filling each engine to its optimal threshold in efficiency order, then a
//! top-up pass toward maximum capacity in the same order.

use serde::{Deserialize, Serialize};

use crate::grid::Engine;

/// Allocated output for one running engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    /// Engine id.
    pub id: u32,
    /// Assigned hourly output (kWh).
    pub output: f64,
}

/// Allocates output across running engines for the given demand and solar.
///
/// Only running engines are considered; each shows up in the result exactly
/// once, possibly with zero output. The allocation is deterministic: engines
/// are stable-sorted by efficiency descending, so ties keep the input order.
/// The total never exceeds the summed capacity of the running fleet.
pub fn allocate_output(engines: &[Engine], demand: f64, solar: f64) -> Vec<Allocation> {
    let mut running: Vec<&Engine> = engines.iter().filter(|e| e.is_running).collect();
    if running.is_empty() {
        return Vec::new();
    }
    running.sort_by(|a, b| b.efficiency.total_cmp(&a.efficiency));

    let mut remaining = (demand - solar).max(0.0);
    let mut allocations = Vec::with_capacity(running.len());

    // First pass: fill each engine up to its optimal threshold.
    for engine in &running {
        let output = if remaining >= engine.optimal_threshold {
            remaining -= engine.optimal_threshold;
            engine.optimal_threshold
        } else if remaining > 0.0 {
            let output = remaining;
            remaining = 0.0;
            output
        } else {
            0.0
        };
        allocations.push(Allocation {
            id: engine.id,
            output,
        });
    }

    // Second pass: top engines up toward max capacity in the same order.
    if remaining > 0.0 {
        for (allocation, engine) in allocations.iter_mut().zip(&running) {
            if remaining <= 0.0 {
                break;
            }
            let spare = engine.max_capacity - allocation.output;
            if spare > 0.0 {
                let extra = spare.min(remaining);
                allocation.output += extra;
                remaining -= extra;
            }
        }
    }

    allocations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(id: u32, cap: f64, eff: f64, opt: f64, running: bool) -> Engine {
        Engine {
            id,
            name: format!("E{id}"),
            max_capacity: cap,
            efficiency: eff,
            optimal_threshold: opt,
            is_running: running,
            current_output: 0.0,
        }
    }

    #[test]
    fn reference_two_pass_allocation() {
        // A(max 500, eff 5, opt 150), B(max 300, eff 3, opt 100), demand 700:
        // first pass A=150, B=100; second pass A=500, B=200.
        let engines = vec![engine(1, 500.0, 5.0, 150.0, true), engine(2, 300.0, 3.0, 100.0, true)];
        let alloc = allocate_output(&engines, 700.0, 0.0);
        assert_eq!(alloc.len(), 2);
        assert_eq!(alloc[0], Allocation { id: 1, output: 500.0 });
        assert_eq!(alloc[1], Allocation { id: 2, output: 200.0 });
    }

    #[test]
    fn solar_reduces_allocated_demand() {
        let engines = vec![engine(1, 500.0, 5.0, 150.0, true)];
        let alloc = allocate_output(&engines, 300.0, 200.0);
        assert_eq!(alloc[0].output, 100.0);
    }

    #[test]
    fn solar_surplus_allocates_nothing() {
        let engines = vec![engine(1, 500.0, 5.0, 150.0, true)];
        let alloc = allocate_output(&engines, 100.0, 400.0);
        assert_eq!(alloc.len(), 1);
        assert_eq!(alloc[0].output, 0.0);
    }

    #[test]
    fn partial_threshold_for_last_engine() {
        // Demand 200 fills A to 150 and leaves B with the remaining 50.
        let engines = vec![engine(1, 500.0, 5.0, 150.0, true), engine(2, 300.0, 3.0, 100.0, true)];
        let alloc = allocate_output(&engines, 200.0, 0.0);
        assert_eq!(alloc[0].output, 150.0);
        assert_eq!(alloc[1].output, 50.0);
    }

    #[test]
    fn stopped_engines_are_excluded() {
        let engines = vec![engine(1, 500.0, 5.0, 150.0, false), engine(2, 300.0, 3.0, 100.0, true)];
        let alloc = allocate_output(&engines, 400.0, 0.0);
        assert_eq!(alloc.len(), 1);
        assert_eq!(alloc[0].id, 2);
        assert_eq!(alloc[0].output, 300.0); // capped at max capacity
    }

    #[test]
    fn total_never_exceeds_fleet_capacity() {
        let engines = vec![engine(1, 500.0, 5.0, 150.0, true), engine(2, 300.0, 3.0, 100.0, true)];
        let alloc = allocate_output(&engines, 5000.0, 0.0);
        let total: f64 = alloc.iter().map(|a| a.output).sum();
        assert_eq!(total, 800.0);
    }

    #[test]
    fn efficiency_ties_keep_input_order() {
        let engines = vec![engine(7, 300.0, 4.0, 100.0, true), engine(3, 300.0, 4.0, 100.0, true)];
        let alloc = allocate_output(&engines, 150.0, 0.0);
        assert_eq!(alloc[0].id, 7);
        assert_eq!(alloc[0].output, 100.0);
        assert_eq!(alloc[1].id, 3);
        assert_eq!(alloc[1].output, 50.0);
    }

    #[test]
    fn no_running_engines_returns_empty() {
        let engines = vec![engine(1, 500.0, 5.0, 150.0, false)];
        assert!(allocate_output(&engines, 400.0, 0.0).is_empty());
    }
}
