//! Read-only projections of grid state for analysis and plotting.
//!
//! Nothing here advances a random stream: neighbour resolution on a
//! fully-connected grid draws from a clone of the neighbour stream.

use std::fmt::Write;

use crate::core::error::{Result, SandpileError};
use crate::domain::rules::GridValueType;
use crate::spatial::grid::Grid;
use crate::systems::toppling::Toppling;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::SandPileCore;

fn sand(pile: &SandPileCore) -> Result<&Toppling> {
    pile.toppling
        .as_ref()
        .ok_or(SandpileError::ResourceMissing("sand grid"))
}

fn field(pile: &SandPileCore) -> Result<&Grid> {
    pile.diss_toppling
        .as_ref()
        .map(Toppling::grid)
        .ok_or(SandpileError::ResourceMissing("dissipation grid"))
}

fn check_len(values: &[f32], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(SandpileError::invariant(format!(
            "snapshot buffer holds {} values, grid needs {}",
            values.len(),
            expected
        )));
    }
    Ok(())
}

/// Apply `f` to every (index, slot) pair of `values`.
/// PARALLEL: rayon over the buffer when the feature is enabled
fn fill<F>(values: &mut [f32], f: F)
where
    F: Fn(usize) -> f32 + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        values.par_iter_mut().enumerate().for_each(|(i, v)| *v = f(i));
    }
    #[cfg(not(feature = "parallel"))]
    {
        values.iter_mut().enumerate().for_each(|(i, v)| *v = f(i));
    }
}

pub(super) fn get_values(pile: &SandPileCore, values: &mut [f32], kind: GridValueType) -> Result<()> {
    let cells = (pile.size as usize) * (pile.size as usize);
    check_len(values, cells)?;

    match kind {
        GridValueType::Height => {
            let grid = sand(pile)?.grid();
            fill(values, |i| grid.cells()[i].height() as f32);
        }
        GridValueType::HeightScaled => {
            let grid = sand(pile)?.grid();
            fill(values, |i| {
                let c = &grid.cells()[i];
                (c.height() / c.max_capacity()) as f32
            });
        }
        GridValueType::CriticalCells => {
            let toppling = sand(pile)?;
            let level = toppling.critical_level();
            let grid = toppling.grid();
            fill(values, |i| {
                let c = &grid.cells()[i];
                if c.height() >= level {
                    c.max_capacity() as f32
                } else {
                    0.0
                }
            });
        }
        GridValueType::NonCriticalNeighbourhood => {
            let toppling = sand(pile)?;
            let grid = toppling.grid();
            // stays serial: neighbour draws must come in index order
            let mut rng = pile.streams.neighbour.clone();
            for (idx, v) in values.iter_mut().enumerate() {
                let (i, j) = grid.coords(idx);
                let neighbours = grid.neighbours(i, j, &mut rng)?;
                let level = toppling.threshold()
                    - toppling.dissipation_amount() / neighbours.len().max(1) as f64;
                let hot = neighbours
                    .iter()
                    .any(|&n| grid.cell_at(n).map_or(false, |c| c.height() >= level));
                *v = if hot { 1.0 } else { 0.0 };
            }
        }
        GridValueType::Dissipation => {
            let grid = field(pile)?;
            fill(values, |i| {
                let c = &grid.cells()[i];
                (c.height() / c.max_capacity()) as f32
            });
        }
        GridValueType::Direction => {
            let grid = field(pile)?;
            fill(values, |i| grid.cells()[i].direction().index() as f32 / 4.0);
        }
        GridValueType::OrderParam1 => {
            return Err(SandpileError::config(
                "order parameter is computed by the multi-resolution analysis, not per cell",
            ));
        }
    }
    Ok(())
}

pub(super) fn get_value(pile: &SandPileCore, kind: GridValueType) -> Result<i64> {
    match kind {
        GridValueType::HeightScaled => Ok(sand(pile)?.grid().count_grains() as i64),
        GridValueType::CriticalCells => Ok(sand(pile)?.count_critical_cells() as i64),
        // no scalar summary exists for the field yet
        GridValueType::Dissipation | GridValueType::Direction => field(pile).map(|_| -1),
        GridValueType::Height
        | GridValueType::NonCriticalNeighbourhood
        | GridValueType::OrderParam1 => Err(SandpileError::config(format!(
            "{kind:?} has no whole-grid value"
        ))),
    }
}

pub(super) fn coarsen(pile: &SandPileCore, values: &mut [f32], patch: u32) -> Result<()> {
    if patch == 1 {
        return get_values(pile, values, GridValueType::Height);
    }
    let l = pile.size;
    if patch == 0 || l % patch != 0 {
        return Err(SandpileError::invariant(format!(
            "patch size {patch} does not divide grid side {l}"
        )));
    }
    let patches = (l / patch) as usize;
    check_len(values, patches * patches)?;

    let grid = sand(pile)?.grid();
    let cells = grid.cells();
    let width = l as usize;
    let p = patch as usize;
    fill(values, |n| {
        let (pi, pj) = (n % patches, n / patches);
        let mut sum = 0.0;
        for j in pj * p..(pj + 1) * p {
            let row = j * width;
            for i in pi * p..(pi + 1) * p {
                sum += cells[row + i].height();
            }
        }
        sum as f32
    });
    Ok(())
}

pub(super) fn print(pile: &SandPileCore) -> String {
    let mut out = String::new();
    if let Some(toppling) = pile.toppling.as_ref() {
        let _ = writeln!(out, "sand grid ({})", toppling.rule());
        let _ = write!(out, "{}", toppling.grid());
    }
    if let Some(diss) = pile.diss_toppling.as_ref() {
        let _ = writeln!(out, "dissipation grid ({})", diss.rule());
        let _ = write!(out, "{}", diss.grid());
    }
    out
}
