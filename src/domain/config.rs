//! Run configuration record
//!
//! Produced outside the engine (run directory bookkeeping, CLI, JS) and
//! handed over as JSON. Missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::random::Feeds;
use crate::domain::cell::Grain;
use crate::domain::rules::{BoundaryType, TopplingRule};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandPileConfig {
    /// Side of the square grid (L).
    pub system_size: u32,
    pub toppling_rule: TopplingRule,
    /// `undefined` keeps the rule's default boundary.
    pub boundary_type: BoundaryType,
    /// Negative means "rule default".
    pub toppling_threshold: Grain,
    pub dissipative_mode: bool,
    pub dissipation_rate: f64,
    /// Grains removed per toppling; split over the neighbours.
    pub dissipation_amount: Grain,
    /// Rossum2011: companion-field height at which grains are absorbed.
    pub dissipation_threshold: Grain,
    /// Capacity of dissipation-field cells.
    pub dissipation_cell_capacity: Grain,
    /// Particles spread over the dissipation field by `populate`.
    pub dissipation_total: Grain,
    /// grid, toppling, direction, drive, dissipation, neighbour.
    pub feeds: Vec<u64>,
}

impl Default for SandPileConfig {
    fn default() -> Self {
        SandPileConfig {
            system_size: 64,
            toppling_rule: TopplingRule::BakTangWiesenfeld1987,
            boundary_type: BoundaryType::Undefined,
            toppling_threshold: -1.0,
            dissipative_mode: false,
            dissipation_rate: 0.1,
            dissipation_amount: 4.0,
            dissipation_threshold: 3.0,
            dissipation_cell_capacity: 10.0,
            dissipation_total: 640.0,
            feeds: Feeds::default().to_vec(),
        }
    }
}

impl SandPileConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Feeds for the random streams; `None` when fewer than six were given.
    pub fn feeds(&self) -> Option<Feeds> {
        Feeds::from_slice(&self.feeds)
    }
}
