//! SandPile - composes the sand grid and the optional dissipation field
//!
//! `SandPileCore` owns both topplings, the six random streams and the
//! avalanche histogram. The experiment loop calls `drive` then `relax`;
//! analysis reads snapshots through `get_values`, `get_value`, `coarsen`.
//!
//! Layout:
//! - init/      construction and configuration
//! - commands/  drive, populate, clear
//! - step/      relaxation
//! - render/    read-only snapshot projections
//! - perf/      relax timing
//! - facade     wasm-bindgen wrapper

use crate::core::error::{Result, SandpileError};
use crate::core::random::{Feeds, RngStreams};
use crate::domain::cell::{CellIndex, Grain};
use crate::domain::config::SandPileConfig;
use crate::domain::events::EventCounter;
use crate::domain::rules::{BoundaryType, GridValueType, TopplingRule};
use crate::spatial::grid::Grid;
use crate::systems::toppling::Toppling;

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
#[path = "commands/commands.rs"]
mod commands;
#[path = "step/relax.rs"]
mod relax;
#[path = "render/render_extract.rs"]
mod render_extract;
mod facade;

pub use facade::SandPile;
pub use perf_stats::PerfStats;

use perf_timer::PerfTimer;

pub struct SandPileCore {
    size: u32,
    rule: TopplingRule,
    boundary: BoundaryType,

    // Absent only for the standalone dissipation-field model.
    toppling: Option<Toppling>,
    diss_toppling: Option<Toppling>,

    avalanches: EventCounter,
    streams: RngStreams,
    drives: u64,

    // Perf metrics
    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl SandPileCore {
    /// Build an `size` x `size` pile. `BoundaryType::Undefined` picks the
    /// rule's default boundary; anything else overrides it with a warning.
    pub fn new(size: u32, rule: TopplingRule, boundary: BoundaryType, feeds: &Feeds) -> Result<Self> {
        init::create_sand_pile(size, rule, boundary, feeds)
    }

    /// Build from a run configuration and apply its per-rule settings.
    pub fn from_config(config: &SandPileConfig) -> Result<Self> {
        init::create_from_config(config)
    }

    pub fn from_config_json(json: &str) -> Result<Self> {
        Self::from_config(&SandPileConfig::from_json(json)?)
    }

    #[inline]
    pub fn size(&self) -> u32 { self.size }

    #[inline]
    pub fn rule(&self) -> TopplingRule { self.rule }

    /// Boundary of the sand grid after resolving the rule default.
    #[inline]
    pub fn boundary(&self) -> BoundaryType { self.boundary }

    /// Grains dropped by `drive` so far.
    #[inline]
    pub fn drives(&self) -> u64 { self.drives }

    // === Toppling access ===

    pub fn toppling(&self) -> Option<&Toppling> {
        self.toppling.as_ref()
    }

    pub fn toppling_mut(&mut self) -> Result<&mut Toppling> {
        self.toppling
            .as_mut()
            .ok_or(SandpileError::ResourceMissing("sand grid"))
    }

    pub fn diss_toppling(&self) -> Option<&Toppling> {
        self.diss_toppling.as_ref()
    }

    pub fn diss_toppling_mut(&mut self) -> Result<&mut Toppling> {
        self.diss_toppling
            .as_mut()
            .ok_or(SandpileError::ResourceMissing("dissipation grid"))
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.toppling.as_ref().map(Toppling::grid)
    }

    pub fn diss_grid(&self) -> Option<&Grid> {
        self.diss_toppling.as_ref().map(Toppling::grid)
    }

    // === Commands ===

    /// Drop one grain at a random admissible cell; returns its index.
    pub fn drive(&mut self) -> Result<CellIndex> {
        commands::drive(self)
    }

    /// Seed the dissipation field: each cell gets `particles` with
    /// probability `cell_count / L²`, otherwise is emptied. Returns the total.
    pub fn populate(&mut self, cell_count: usize, particles: Grain) -> Result<Grain> {
        commands::populate(self, cell_count, particles)
    }

    /// Empty the sand grid. The dissipation field is left alone.
    pub fn clear(&mut self) {
        commands::clear(self)
    }

    /// Add grains to sand-grid cell `(i, j)` without relaxing.
    pub fn add_grains(&mut self, i: u32, j: u32, n: Grain) -> Result<()> {
        commands::add_grains(self, i, j, n)
    }

    // === Dynamics ===

    /// Relax the dissipation field, then the sand grid. Returns the combined
    /// number of toppling events when `measure` is set (and records it),
    /// otherwise 0.
    pub fn relax(&mut self, measure: bool) -> Result<u64> {
        relax::relax(self, measure)
    }

    pub fn avalanches(&self) -> &EventCounter {
        &self.avalanches
    }

    pub fn avalanches_json(&self) -> String {
        self.avalanches.to_json()
    }

    /// Grain totals recorded during avalanches, if switched on.
    pub fn grains_during_avalanches(&self) -> Option<&EventCounter> {
        self.toppling
            .as_ref()
            .and_then(Toppling::grains_during_avalanches)
    }

    // === Snapshots ===

    /// Fill `values` (length L²) with a per-cell projection.
    pub fn get_values(&self, values: &mut [f32], kind: GridValueType) -> Result<()> {
        render_extract::get_values(self, values, kind)
    }

    /// Whole-grid scalar for `kind`.
    pub fn get_value(&self, kind: GridValueType) -> Result<i64> {
        render_extract::get_value(self, kind)
    }

    /// Patch-summed heights; `values` holds (L / patch)² entries.
    pub fn coarsen(&self, values: &mut [f32], patch: u32) -> Result<()> {
        render_extract::coarsen(self, values, patch)
    }

    /// Diagnostic text dump of both grids.
    pub fn print(&self) -> String {
        render_extract::print(self)
    }

    // === Perf ===

    /// Enable or disable per-relax perf metrics
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    /// Last relax perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        settings::get_perf_stats(self)
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
