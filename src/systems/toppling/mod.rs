//! Toppling - relaxation engine bound to one grid
//!
//! Decides whether a cell topples, redistributes its grains under one of five
//! rules, and sweeps the grid to a fixed point with one of three strategies.
//!
//! - redistribute: per-cell rule dispatch (`topple_cell`)
//! - sweep:        the fixed-point loop (`topple`)
//! - active:       the FollowActivity working set
//!
//! Configure the rule first, then threshold and capacity: the threshold
//! default depends on the rule.

use tracing::warn;

use crate::core::error::{Result, SandpileError};
use crate::domain::cell::{CellIndex, Grain};
use crate::domain::events::EventCounter;
use crate::domain::rules::{IterationStrategy, TopplingRule};
use crate::spatial::grid::Grid;

mod active;
mod redistribute;
mod sweep;

pub use active::ActiveSet;
pub use sweep::ToppleReport;

pub struct Toppling {
    grid: Grid,

    rule: TopplingRule,
    strategy: IterationStrategy,
    threshold: Grain,

    dissipative_mode: bool,
    dissipation_rate: f64,
    dissipation_amount: Grain,
    dissipation_threshold: Grain,
    equal_split: bool,

    active: ActiveSet,
    // Sweep order for the random strategies; reshuffled every pass.
    sweep_order: Vec<CellIndex>,
    // Reused extraction buffer for FollowActivity.
    batch: Vec<CellIndex>,

    during_avalanches: Option<EventCounter>,
}

impl Toppling {
    /// Bind a toppling to `grid` with the rule's default threshold and the
    /// FollowActivity strategy.
    pub fn new(grid: Grid, rule: TopplingRule) -> Result<Self> {
        let threshold = rule.default_threshold()?;
        let size = grid.size();
        let mut toppling = Self {
            rule,
            strategy: IterationStrategy::FollowActivity,
            threshold,
            dissipative_mode: false,
            dissipation_rate: 0.1,
            dissipation_amount: 4.0,
            dissipation_threshold: 0.0,
            equal_split: false,
            active: ActiveSet::new(size, threshold, true),
            sweep_order: (0..size).collect(),
            batch: Vec::new(),
            during_avalanches: None,
            grid,
        };
        toppling.active.rebuild(&toppling.grid);
        Ok(toppling)
    }

    // === Grid access ===

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Register every grid cell with this toppling's active set.
    pub fn watch_all(&mut self) {
        self.grid.watch_all();
        self.active.rebuild(&self.grid);
    }

    /// Add grains to a cell, keeping the active set current.
    pub fn increase(&mut self, idx: CellIndex, n: Grain) -> Result<()> {
        self.grid.increase(idx, n, &mut self.active)
    }

    pub fn decrease(&mut self, idx: CellIndex, n: Grain) -> Result<()> {
        self.grid.decrease(idx, n, &mut self.active)
    }

    pub fn clear_cell(&mut self, idx: CellIndex) -> Result<()> {
        self.grid.clear_cell(idx, &mut self.active)
    }

    /// Empty every grid cell.
    pub fn clear(&mut self) {
        self.grid.clear(&mut self.active);
    }

    // === Configuration ===

    #[inline]
    pub fn rule(&self) -> TopplingRule {
        self.rule
    }

    /// Switch rule and reset the threshold to the rule's default.
    pub fn set_rule(&mut self, rule: TopplingRule) -> Result<()> {
        self.threshold = rule.default_threshold()?;
        self.rule = rule;
        self.sync_active();
        Ok(())
    }

    #[inline]
    pub fn threshold(&self) -> Grain {
        self.threshold
    }

    /// Override the threshold. Negative restores the rule default.
    pub fn set_threshold(&mut self, threshold: Grain) -> Result<()> {
        if self.rule == TopplingRule::Undefined {
            return Err(SandpileError::config("set a toppling rule before its threshold"));
        }
        if threshold < 0.0 {
            self.threshold = self.rule.default_threshold()?;
        } else if threshold != self.threshold {
            warn!("Non-standard toppling threshold: {}", threshold);
            self.threshold = threshold;
        }
        self.sync_active();
        Ok(())
    }

    #[inline]
    pub fn strategy(&self) -> IterationStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: IterationStrategy) {
        self.strategy = strategy;
        self.active
            .set_tracking(strategy == IterationStrategy::FollowActivity);
        self.active.rebuild(&self.grid);
    }

    #[inline]
    pub fn dissipative_mode(&self) -> bool {
        self.dissipative_mode
    }

    pub fn set_dissipative_mode(&mut self, mode: bool) {
        self.dissipative_mode = mode;
        if self.rule == TopplingRule::LinEtal2006 && !mode {
            warn!("Toppling in Lin_etal2006 normally is with bulk-dissipation");
        }
    }

    #[inline]
    pub fn dissipation_rate(&self) -> f64 {
        self.dissipation_rate
    }

    pub fn set_dissipation_rate(&mut self, rate: f64) {
        self.dissipation_rate = rate;
    }

    #[inline]
    pub fn dissipation_amount(&self) -> Grain {
        self.dissipation_amount
    }

    /// Grains removed per toppling. Zero or less means "one per neighbour".
    pub fn set_dissipation_amount(&mut self, amount: Grain) {
        self.dissipation_amount = amount;
    }

    #[inline]
    pub fn dissipation_threshold(&self) -> Grain {
        self.dissipation_threshold
    }

    pub fn set_dissipation_threshold(&mut self, threshold: Grain) {
        self.dissipation_threshold = threshold;
    }

    #[inline]
    pub fn equal_split(&self) -> bool {
        self.equal_split
    }

    /// Hand every neighbour the same share instead of a random split.
    pub fn set_equal_split(&mut self, equal: bool) {
        self.equal_split = equal;
    }

    /// Capacity of every grid cell. Warns below twice the threshold.
    pub fn set_cell_capacity(&mut self, capacity: Grain) {
        if capacity < 2.0 * self.threshold {
            warn!(
                "cell capacity {} is below twice the toppling threshold {}",
                capacity, self.threshold
            );
        }
        self.grid.set_capacity(capacity);
    }

    /// Record the grid's grain total around every FollowActivity pass.
    /// Switching on starts a fresh counter; switching off drops it.
    pub fn set_counter_during_avalanches(&mut self, count: bool) {
        self.during_avalanches = count.then(EventCounter::new);
    }

    pub fn grains_during_avalanches(&self) -> Option<&EventCounter> {
        self.during_avalanches.as_ref()
    }

    // === Statistics ===

    /// Height at which a cell is taken to be critical.
    #[inline]
    pub fn critical_level(&self) -> Grain {
        self.threshold - self.dissipation_amount / 4.0
    }

    /// Cells whose height equals `critical_level()` exactly.
    pub fn count_critical_cells(&self) -> usize {
        let level = self.critical_level();
        self.grid
            .cells()
            .iter()
            .filter(|c| c.height() == level)
            .count()
    }

    /// Members of the active set; zero for the random strategies.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    fn sync_active(&mut self) {
        self.active.set_threshold(self.threshold);
        self.active.rebuild(&self.grid);
    }
}
