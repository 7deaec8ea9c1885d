use super::*;

use crate::domain::cell::{CellObserver, Grain};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

impl Grid {
    /// All non-reservoir cells, row-major.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Total grains over every cell except the reservoir.
    /// PARALLEL: rayon reduction when the feature is enabled
    pub fn count_grains(&self) -> Grain {
        #[cfg(feature = "parallel")]
        {
            self.cells.par_iter().map(Cell::height).sum()
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.cells.iter().map(Cell::height).sum()
        }
    }

    // === Mutation by index (reservoir included) ===
    // Every index is checked: out-of-range is an `InvariantViolation`.

    pub fn increase(&mut self, idx: CellIndex, n: Grain, observer: &mut dyn CellObserver) -> Result<()> {
        self.check_index(idx)?;
        self.slot_mut(idx).increase(n, observer);
        Ok(())
    }

    pub fn decrease(&mut self, idx: CellIndex, n: Grain, observer: &mut dyn CellObserver) -> Result<()> {
        self.check_index(idx)?;
        self.slot_mut(idx).decrease(n, observer);
        Ok(())
    }

    pub fn clear_cell(&mut self, idx: CellIndex, observer: &mut dyn CellObserver) -> Result<()> {
        self.check_index(idx)?;
        self.slot_mut(idx).clear(observer);
        Ok(())
    }

    /// Empty every grid cell. The reservoir keeps what it collected.
    pub fn clear(&mut self, observer: &mut dyn CellObserver) {
        for cell in self.cells.iter_mut() {
            cell.clear(observer);
        }
    }

    /// `Cell::transfer` between two indices of this grid.
    pub fn transfer(&mut self, from: CellIndex, to: CellIndex, n: Grain) -> Result<Grain> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            // net effect of moving grains onto yourself is nothing
            let cell = self.slot(from);
            return Ok(Cell::transferable(cell.height(), cell, n));
        }
        let moved = match (from == RESERVOIR, to == RESERVOIR) {
            (true, _) => self.reservoir.transfer(fast!(self.cells, mut [to]), n),
            (_, true) => fast!(self.cells, mut [from]).transfer(&mut self.reservoir, n),
            _ => {
                let (source, target) = if from < to {
                    let (lo, hi) = self.cells.split_at_mut(to);
                    (&mut lo[from], &mut hi[0])
                } else {
                    let (lo, hi) = self.cells.split_at_mut(from);
                    (&mut hi[0], &mut lo[to])
                };
                source.transfer(target, n)
            }
        };
        Ok(moved)
    }

    /// Capacity for every grid cell.
    pub fn set_capacity(&mut self, capacity: Grain) {
        for cell in self.cells.iter_mut() {
            cell.set_max_capacity(capacity);
        }
    }

    /// Register every grid cell (not the reservoir) for change notification.
    pub fn watch_all(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.observe();
        }
    }
}
