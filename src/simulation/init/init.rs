use tracing::{info, warn};

use crate::core::error::{Result, SandpileError};
use crate::core::random::{Feeds, RngStreams};
use crate::domain::config::SandPileConfig;
use crate::domain::events::EventCounter;
use crate::domain::rules::{BoundaryType, IterationStrategy, TopplingRule};
use crate::spatial::grid::Grid;
use crate::systems::toppling::Toppling;

use super::perf_stats::PerfStats;
use super::settings;
use super::SandPileCore;

pub(super) fn create_sand_pile(
    size: u32,
    rule: TopplingRule,
    requested: BoundaryType,
    feeds: &Feeds,
) -> Result<SandPileCore> {
    if rule == TopplingRule::Undefined {
        return Err(SandpileError::config(
            "unknown toppling rule, no boundary condition to pick",
        ));
    }
    let boundary = resolve_boundary(rule, requested)?;
    let mut streams = RngStreams::new(feeds);

    let (toppling, diss_toppling) = if rule == TopplingRule::Rossum2011Diss {
        // the flocking field on its own, without sand
        (None, Some(dissipation_toppling(size, &mut streams)?))
    } else {
        let grid = Grid::new(size, size, boundary, &mut streams.direction, &mut streams.neighbour)?;
        let mut toppling = Toppling::new(grid, rule)?;
        toppling.set_strategy(IterationStrategy::FollowActivity);
        toppling.set_counter_during_avalanches(false);
        toppling.watch_all();

        let diss = if rule.uses_dissipation_field() {
            Some(dissipation_toppling(size, &mut streams)?)
        } else {
            None
        };
        (Some(toppling), diss)
    };

    info!("sandpile {}x{} with rule {}", size, size, rule);

    Ok(SandPileCore {
        size,
        rule,
        boundary,
        toppling,
        diss_toppling,
        avalanches: EventCounter::new(),
        streams,
        drives: 0,
        perf_enabled: false,
        perf_stats: PerfStats::default(),
    })
}

pub(super) fn create_from_config(config: &SandPileConfig) -> Result<SandPileCore> {
    let feeds = config.feeds().unwrap_or_else(|| {
        warn!(
            "not enough feeds for random generators ({} given), using defaults",
            config.feeds.len()
        );
        Feeds::default()
    });
    let mut pile = create_sand_pile(
        config.system_size,
        config.toppling_rule,
        config.boundary_type,
        &feeds,
    )?;
    settings::apply_config(&mut pile, config)?;
    Ok(pile)
}

/// Rule default, or the explicit override with a warning when they differ.
fn resolve_boundary(rule: TopplingRule, requested: BoundaryType) -> Result<BoundaryType> {
    let default = rule.default_boundary()?;
    if requested != BoundaryType::Undefined && requested != default {
        warn!(
            "overwriting default boundary type \"{}\" by \"{}\"",
            default, requested
        );
        return Ok(requested);
    }
    info!("standard boundary type \"{}\"", default);
    Ok(default)
}

/// Periodic companion grid relaxed by the flocking rule, visiting all cells.
fn dissipation_toppling(size: u32, streams: &mut RngStreams) -> Result<Toppling> {
    let grid = Grid::new(
        size,
        size,
        BoundaryType::Periodic,
        &mut streams.direction,
        &mut streams.neighbour,
    )?;
    let mut toppling = Toppling::new(grid, TopplingRule::Rossum2011Diss)?;
    toppling.set_strategy(IterationStrategy::RandomAll);
    toppling.set_counter_during_avalanches(false);
    Ok(toppling)
}
