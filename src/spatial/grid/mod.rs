//! Grid - contiguous row-major cell store plus one shared reservoir
//!
//! Cells are addressed by index, never by reference: neighbour lists hold
//! indices, and the reservoir is the reserved index `RESERVOIR`. Several
//! neighbour slots of one cell may name the reservoir at the same time; grains
//! sent there simply accumulate.

use rand::seq::SliceRandom;
use tracing::info;

use crate::core::error::{Result, SandpileError};
use crate::core::random::Stream;
use crate::domain::cell::{Cell, CellIndex, RESERVOIR};
use crate::domain::rules::BoundaryType;

mod accessors;
mod indexing;
mod neighbours;
mod text;
mod topology;

pub use neighbours::Neighbours;

pub struct Grid {
    width: u32,
    height: u32,
    size: usize,
    boundary: BoundaryType,

    cells: Vec<Cell>,
    reservoir: Cell,

    // Quenched permutation used by `RandomNeighbours`. Shuffled once here,
    // whatever the boundary, so the neighbour stream advances identically.
    permutation: Vec<CellIndex>,
}

impl Grid {
    /// Build a `width` x `height` grid with the given boundary.
    ///
    /// Consumes one direction draw per cell (reservoir included) and one
    /// shuffle from the neighbour stream.
    pub fn new(
        width: u32,
        height: u32,
        boundary: BoundaryType,
        direction_rng: &mut Stream,
        neighbour_rng: &mut Stream,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SandpileError::invariant(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }
        if boundary == BoundaryType::Circular {
            Self::check_circle_shape(width, height)?;
        }

        let size = (width as usize) * (height as usize);
        info!(
            "create cells {}*{} (total={}) and type {}",
            width, height, size, boundary
        );

        let cells = (0..size).map(|id| Cell::new(id, direction_rng)).collect();
        let reservoir = Cell::new(RESERVOIR, direction_rng);

        let mut permutation: Vec<CellIndex> = (0..size).collect();
        permutation.shuffle(neighbour_rng);

        Ok(Self {
            width,
            height,
            size,
            boundary,
            cells,
            reservoir,
            permutation,
        })
    }

    #[inline]
    pub fn boundary(&self) -> BoundaryType {
        self.boundary
    }

    /// The shared sink/source outside the grid.
    #[inline]
    pub fn reservoir(&self) -> &Cell {
        &self.reservoir
    }

    fn check_circle_shape(width: u32, height: u32) -> Result<()> {
        if width != height || width % 2 != 0 {
            return Err(SandpileError::invariant(format!(
                "circular topology needs a square grid with even side, got {width}x{height}"
            )));
        }
        Ok(())
    }
}
