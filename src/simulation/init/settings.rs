use crate::core::error::Result;
use crate::domain::config::SandPileConfig;

use super::perf_stats::PerfStats;
use super::SandPileCore;

/// Particles dropped per seeded cell of the dissipation field.
const POPULATE_PARTICLES: f64 = 5.0;

/// Apply a run configuration in dependency order: threshold before the
/// capacity derived from it, capacity before seeding the field.
pub(super) fn apply_config(pile: &mut SandPileCore, config: &SandPileConfig) -> Result<()> {
    if let Some(toppling) = pile.toppling.as_mut() {
        toppling.set_dissipative_mode(config.dissipative_mode);
        toppling.set_dissipation_threshold(config.dissipation_threshold);
        toppling.set_threshold(config.toppling_threshold)?;
        let capacity = toppling.threshold() * 4.0;
        toppling.set_cell_capacity(capacity);
        toppling.set_dissipation_rate(config.dissipation_rate);
        toppling.set_dissipation_amount(config.dissipation_amount);
    }

    if let Some(diss) = pile.diss_toppling.as_mut() {
        diss.set_cell_capacity(config.dissipation_cell_capacity);
        let cells = (config.dissipation_total / POPULATE_PARTICLES) as usize;
        pile.populate(cells, POPULATE_PARTICLES)?;
    }
    Ok(())
}

pub(super) fn enable_perf_metrics(pile: &mut SandPileCore, enabled: bool) {
    pile.perf_enabled = enabled;
    if !enabled {
        pile.perf_stats.reset();
    }
}

pub(super) fn get_perf_stats(pile: &SandPileCore) -> PerfStats {
    pile.perf_stats.clone()
}
