//! The optimization core: pure functions over grid snapshots.
//!
//! Nothing in this module reads shared state or performs I/O; callers pass
//! engine lists and solar/demand scalars in and get structured results back.

pub mod dispatch;
pub mod fuel;
pub mod instruct;
pub mod suggest;

pub use dispatch::{Allocation, allocate_output};
pub use fuel::{
    DIESEL_CO2_KG_PER_LITER, EconomicImpact, carbon_emissions, economic_impact, efficiency_ratio,
    fuel_consumption, fuel_cost,
};
pub use instruct::{
    ForecastInstruction, Instruction, InstructionKind, InstructionSet, Priority,
    generate_instructions,
};
pub use suggest::{
    OptimizationSuggestion, SuggestedAction, WeatherOutlook, generate_suggestions,
};
