//! Domain - what a sandpile is made of, independent of how it is relaxed.

pub mod cell;
pub mod config;
pub mod events;
pub mod rules;

pub use cell::{Cell, CellIndex, CellObserver, Grain, Unobserved, RESERVOIR};
pub use config::SandPileConfig;
pub use events::EventCounter;
pub use rules::{BoundaryType, Direction, GridValueType, IterationStrategy, TopplingRule};
