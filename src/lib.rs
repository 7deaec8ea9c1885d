//! Sandpile Engine - self-organized criticality on a 2D grid, native and WASM
//!
//! Grains are dropped on a grid; cells at threshold topple and push grains to
//! their neighbours until the grid is stable again. Five published toppling
//! rules and six boundary topologies are supported.
//!
//! Architecture:
//! - core/       - errors, random streams, `fast!` indexing
//! - domain/     - cells, model selectors, configuration, event histograms
//! - spatial/    - grid storage and neighbour resolution
//! - systems/    - toppling (relaxation) engine
//! - simulation/ - sandpile coordinator and the JS facade

// Safety macros (must be first for macro export!)
#[macro_use]
pub mod core;
pub mod domain;
pub mod spatial;
pub mod systems;
pub mod simulation;

// Compatibility re-exports
pub use spatial::grid;
pub use systems::toppling;

use wasm_bindgen::prelude::*;

// Thread pool for the rayon reductions in the browser
#[cfg(all(feature = "parallel", target_arch = "wasm32", target_feature = "atomics"))]
pub use wasm_bindgen_rayon::init_thread_pool;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    web_sys::console::log_1(&"Sandpile WASM engine initialized".into());
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Re-export main types
pub use crate::core::error::{Result, SandpileError};
pub use crate::core::random::{Feeds, RngStreams};
pub use domain::{
    BoundaryType, Cell, CellIndex, EventCounter, Grain, GridValueType, IterationStrategy,
    SandPileConfig, TopplingRule, RESERVOIR,
};
pub use simulation::{PerfStats, SandPile, SandPileCore};

// Export rule codes for JS
#[wasm_bindgen]
pub fn rule_manna_lin2010() -> u8 { TopplingRule::MannaLin2010 as u8 }
#[wasm_bindgen]
pub fn rule_btw1987() -> u8 { TopplingRule::BakTangWiesenfeld1987 as u8 }
#[wasm_bindgen]
pub fn rule_lin2006() -> u8 { TopplingRule::LinEtal2006 as u8 }
#[wasm_bindgen]
pub fn rule_rossum2011() -> u8 { TopplingRule::Rossum2011 as u8 }
#[wasm_bindgen]
pub fn rule_rossum2011_diss() -> u8 { TopplingRule::Rossum2011Diss as u8 }

// Export boundary codes for JS
#[wasm_bindgen]
pub fn boundary_default() -> u8 { BoundaryType::Undefined as u8 }
#[wasm_bindgen]
pub fn boundary_periodic() -> u8 { BoundaryType::Periodic as u8 }
#[wasm_bindgen]
pub fn boundary_dissipating() -> u8 { BoundaryType::Dissipating as u8 }
#[wasm_bindgen]
pub fn boundary_wall_dissipating() -> u8 { BoundaryType::WallDissipating as u8 }
#[wasm_bindgen]
pub fn boundary_circular() -> u8 { BoundaryType::Circular as u8 }
#[wasm_bindgen]
pub fn boundary_random_neighbours() -> u8 { BoundaryType::RandomNeighbours as u8 }
#[wasm_bindgen]
pub fn boundary_fully_connected() -> u8 { BoundaryType::FullyConnected as u8 }

// Export sweep strategies for JS
#[wasm_bindgen]
pub fn strategy_random_all() -> u8 { IterationStrategy::RandomAll as u8 }
#[wasm_bindgen]
pub fn strategy_random_fraction() -> u8 { IterationStrategy::RandomFraction as u8 }
#[wasm_bindgen]
pub fn strategy_follow_activity() -> u8 { IterationStrategy::FollowActivity as u8 }

// Export snapshot kinds for JS
#[wasm_bindgen]
pub fn value_height() -> u8 { GridValueType::Height as u8 }
#[wasm_bindgen]
pub fn value_height_scaled() -> u8 { GridValueType::HeightScaled as u8 }
#[wasm_bindgen]
pub fn value_critical_cells() -> u8 { GridValueType::CriticalCells as u8 }
#[wasm_bindgen]
pub fn value_dissipation() -> u8 { GridValueType::Dissipation as u8 }
#[wasm_bindgen]
pub fn value_direction() -> u8 { GridValueType::Direction as u8 }
#[wasm_bindgen]
pub fn value_non_critical_neighbourhood() -> u8 { GridValueType::NonCriticalNeighbourhood as u8 }
