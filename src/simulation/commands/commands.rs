use rand::Rng;
use tracing::info;

use crate::core::error::{Result, SandpileError};
use crate::domain::cell::{CellIndex, Grain};
use crate::domain::rules::BoundaryType;

use super::SandPileCore;

/// Seeded fields below this total are too sparse to dissipate anything.
const MIN_POPULATION: Grain = 10.0;

pub(super) fn drive(pile: &mut SandPileCore) -> Result<CellIndex> {
    let toppling = pile
        .toppling
        .as_mut()
        .ok_or(SandpileError::ResourceMissing("sand grid"))?;
    let rng = &mut pile.streams.drive;
    let grid = toppling.grid();
    let (width, height) = (grid.width(), grid.height());

    // Rejection sampling; every boundary admits a positive share of cells.
    let idx = loop {
        let x = rng.gen_range(0..width);
        let y = rng.gen_range(0..height);
        match grid.boundary() {
            BoundaryType::Circular => {
                if grid.within_circle(x, y)? {
                    break grid.index(x, y);
                }
            }
            // Only along the walls: top row or left column, picked by y.
            BoundaryType::WallDissipating => {
                if y < height / 2 {
                    break grid.index(x, 0);
                }
                if x < height {
                    break grid.index(0, x);
                }
            }
            _ => break grid.index(x, y),
        }
    };

    toppling.increase(idx, 1.0)?;
    pile.drives += 1;
    Ok(idx)
}

pub(super) fn populate(pile: &mut SandPileCore, cell_count: usize, particles: Grain) -> Result<Grain> {
    let diss = pile
        .diss_toppling
        .as_mut()
        .ok_or(SandpileError::ResourceMissing("dissipation grid"))?;
    let cells = diss.grid().size();
    if cell_count >= cells {
        return Err(SandpileError::invariant(format!(
            "cannot populate {cell_count} of {cells} cells"
        )));
    }

    let place = cell_count as f64 / cells as f64;
    info!("place if uniform draw < {}", place);

    let rng = &mut pile.streams.dissipation;
    let mut sum = 0.0;
    for idx in 0..cells {
        let seeded = rng.gen::<f64>() < place;
        diss.clear_cell(idx)?;
        if seeded {
            diss.increase(idx, particles)?;
            sum += particles;
        }
    }

    if sum <= MIN_POPULATION {
        return Err(SandpileError::invariant(format!(
            "dissipation field got only {sum} particles, needs more than {MIN_POPULATION}"
        )));
    }
    info!("added {} particles to dissipation grid", sum);
    Ok(sum)
}

pub(super) fn clear(pile: &mut SandPileCore) {
    if let Some(toppling) = pile.toppling.as_mut() {
        toppling.clear();
    }
}

pub(super) fn add_grains(pile: &mut SandPileCore, i: u32, j: u32, n: Grain) -> Result<()> {
    let toppling = pile
        .toppling
        .as_mut()
        .ok_or(SandpileError::ResourceMissing("sand grid"))?;
    let idx = {
        let grid = toppling.grid();
        grid.check_coords(i, j)?;
        grid.index(i, j)
    };
    toppling.increase(idx, n)
}
