use super::*;

impl Grid {
    // === Dimensions ===
    #[inline]
    pub fn width(&self) -> u32 { self.width }

    #[inline]
    pub fn height(&self) -> u32 { self.height }

    #[inline]
    pub fn size(&self) -> usize { self.size }

    // === Index conversion ===
    #[inline]
    pub fn index(&self, i: u32, j: u32) -> CellIndex {
        (j as usize) * (self.width as usize) + (i as usize)
    }

    #[inline]
    pub fn coords(&self, idx: CellIndex) -> (u32, u32) {
        let i = (idx % self.width as usize) as u32;
        let j = (idx / self.width as usize) as u32;
        (i, j)
    }

    // === Bounds checking ===
    #[inline]
    pub fn in_bounds(&self, i: i64, j: i64) -> bool {
        i >= 0 && i < self.width as i64 && j >= 0 && j < self.height as i64
    }

    pub(crate) fn check_coords(&self, i: u32, j: u32) -> Result<()> {
        if i >= self.width || j >= self.height {
            return Err(SandpileError::invariant(format!(
                "cell ({i}, {j}) outside {}x{} grid",
                self.width, self.height
            )));
        }
        Ok(())
    }

    pub(crate) fn check_index(&self, idx: CellIndex) -> Result<()> {
        if idx >= self.size && idx != RESERVOIR {
            return Err(SandpileError::invariant(format!(
                "cell index {idx} outside grid of {} cells",
                self.size
            )));
        }
        Ok(())
    }

    // === Checked lookup ===

    pub fn cell(&self, i: u32, j: u32) -> Result<&Cell> {
        self.check_coords(i, j)?;
        Ok(self.slot(self.index(i, j)))
    }

    pub fn cell_mut(&mut self, i: u32, j: u32) -> Result<&mut Cell> {
        self.check_coords(i, j)?;
        let idx = self.index(i, j);
        Ok(self.slot_mut(idx))
    }

    /// Row-major lookup; `RESERVOIR` resolves to the reservoir cell.
    pub fn cell_at(&self, idx: CellIndex) -> Result<&Cell> {
        self.check_index(idx)?;
        Ok(self.slot(idx))
    }

    pub fn cell_at_mut(&mut self, idx: CellIndex) -> Result<&mut Cell> {
        self.check_index(idx)?;
        Ok(self.slot_mut(idx))
    }

    // === Validated-index access for hot loops ===
    // Callers pass an index that already went through `check_index`.

    #[inline(always)]
    pub(crate) fn slot(&self, idx: CellIndex) -> &Cell {
        if idx == RESERVOIR {
            &self.reservoir
        } else {
            fast!(self.cells, [idx])
        }
    }

    #[inline(always)]
    pub(crate) fn slot_mut(&mut self, idx: CellIndex) -> &mut Cell {
        if idx == RESERVOIR {
            &mut self.reservoir
        } else {
            fast!(self.cells, mut [idx])
        }
    }
}
