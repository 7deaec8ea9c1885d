use tracing::debug;

use crate::core::error::Result;

use super::{PerfTimer, SandPileCore};

/// Dissipation field first, then the sand grid coupled to it.
pub(super) fn relax(pile: &mut SandPileCore, measure: bool) -> Result<u64> {
    let mut timer = pile.perf_enabled.then(PerfTimer::start);
    let mut avalanche = 0u64;

    if let Some(diss) = pile.diss_toppling.as_mut() {
        let report = diss.topple(&mut pile.streams, None)?;
        avalanche += report.events;
        if let Some(t) = timer.as_mut() {
            pile.perf_stats.diss_relax_ms = t.lap();
            pile.perf_stats.diss_events = report.events as u32;
            pile.perf_stats.diss_passes = report.passes as u32;
        }
    }

    if let Some(toppling) = pile.toppling.as_mut() {
        let coupled = pile.diss_toppling.as_ref().map(|d| d.grid());
        let report = toppling.topple(&mut pile.streams, coupled)?;
        avalanche += report.events;
        if let Some(t) = timer.as_mut() {
            pile.perf_stats.relax_ms = t.lap();
            pile.perf_stats.passes = report.passes as u32;
            pile.perf_stats.grid_size = toppling.grid().size() as u32;
            pile.perf_stats.grain_count = toppling.grid().count_grains();
        }
    }

    if timer.is_some() {
        pile.perf_stats.avalanche_size = avalanche as u32;
        pile.perf_stats.drives = pile.drives as u32;
    }

    if avalanche > 0 && measure {
        debug!("avalanche of {} topplings", avalanche);
        pile.avalanches.add_event(avalanche as i64);
        return Ok(avalanche);
    }
    Ok(0)
}
