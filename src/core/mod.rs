//! Core - shared building blocks for every layer of the engine
//!
//! - safety: `fast!` indexing (checked in debug, unchecked in release)
//! - error:  the engine's fail-fast error taxonomy
//! - random: seeded random streams, one per logical consumer

#[macro_use]
#[path = "utils/safety.rs"]
pub mod safety;
pub mod error;
pub mod random;

pub use error::{Result, SandpileError};
pub use random::{Feeds, RngStreams};
