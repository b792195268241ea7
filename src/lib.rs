//! Microgrid simulator: diesel engines + solar + demand over a day/hour
//! clock, with a deterministic optimization and instruction engine.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
/// Grid state types, simulation clock, and procedural profiles.
pub mod grid;
pub mod io;
/// Optimization core: calculators, suggestion/instruction generators, dispatch.
pub mod opt;
pub mod runner;
pub mod store;
