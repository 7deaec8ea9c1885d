use rand::Rng;

use super::*;

/// Offsets in slot order: North, West, South, East.
const OFFSETS: [(i64, i64); 4] = [(0, -1), (-1, 0), (0, 1), (1, 0)];

/// FullyConnected needs four distinct cells besides the one toppling.
const FULLY_CONNECTED_MIN_CELLS: usize = Neighbours::CAPACITY + 1;

impl Grid {
    /// Resolve the neighbours of cell `(i, j)` under this grid's boundary.
    ///
    /// `rng` is only drawn from by `FullyConnected`, which picks four fresh
    /// distinct cells on every call. `RandomNeighbours` uses the permutation
    /// fixed at construction instead.
    pub fn neighbours<R: Rng + ?Sized>(&self, i: u32, j: u32, rng: &mut R) -> Result<Neighbours> {
        self.check_coords(i, j)?;
        let mut out = Neighbours::new();

        match self.boundary {
            BoundaryType::Periodic => {
                for (di, dj) in OFFSETS {
                    out.push(self.wrapped(i, j, di, dj));
                }
            }
            BoundaryType::Dissipating => {
                for (di, dj) in OFFSETS {
                    let (ni, nj) = (i as i64 + di, j as i64 + dj);
                    out.push(self.index_or_reservoir(ni, nj));
                }
            }
            BoundaryType::WallDissipating => {
                // North and West are walls: no slot at all on the first row/column.
                // South and East drain into the reservoir at the far edge.
                if j != 0 {
                    out.push(self.index(i, j - 1));
                }
                if i != 0 {
                    out.push(self.index(i - 1, j));
                }
                if j == self.height - 1 {
                    out.push(RESERVOIR);
                } else {
                    out.push(self.index(i, j + 1));
                }
                if i == self.width - 1 {
                    out.push(RESERVOIR);
                } else {
                    out.push(self.index(i + 1, j));
                }
            }
            BoundaryType::Circular => {
                for (di, dj) in OFFSETS {
                    let (ni, nj) = (i as i64 + di, j as i64 + dj);
                    if self.in_bounds(ni, nj) && self.within_circle_unchecked(ni as u32, nj as u32) {
                        out.push(self.index(ni as u32, nj as u32));
                    } else {
                        out.push(RESERVOIR);
                    }
                }
            }
            BoundaryType::RandomNeighbours => {
                for (di, dj) in OFFSETS {
                    let wrapped = self.wrapped(i, j, di, dj);
                    out.push(*fast!(self.permutation, [wrapped]));
                }
            }
            BoundaryType::FullyConnected => {
                if self.size < FULLY_CONNECTED_MIN_CELLS {
                    return Err(SandpileError::invariant(format!(
                        "fully connected topology needs at least {} cells, grid has {}",
                        FULLY_CONNECTED_MIN_CELLS, self.size
                    )));
                }
                let this = self.index(i, j);
                while out.len() < Neighbours::CAPACITY {
                    let n = rng.gen_range(0..self.size);
                    if n != this && !out.contains(&n) {
                        out.push(n);
                    }
                }
            }
            BoundaryType::Undefined => {
                return Err(SandpileError::config(
                    "undefined boundary type cannot resolve neighbours",
                ));
            }
        }

        Ok(out)
    }

    /// True iff the centre of `(i, j)` lies in the largest circle inscribed in
    /// the grid. Only defined for square grids with an even side.
    pub fn within_circle(&self, i: u32, j: u32) -> Result<bool> {
        Self::check_circle_shape(self.width, self.height)?;
        Ok(self.within_circle_unchecked(i, j))
    }

    #[inline]
    fn within_circle_unchecked(&self, i: u32, j: u32) -> bool {
        let half = self.width as f64 / 2.0;
        let d_i = (half - (i as f64 + 0.5)).abs();
        let d_j = (half - (j as f64 + 0.5)).abs();
        // radius is halved in integers, one cell of margin on both axes
        let radius = ((self.width - 1) / 2) as f64;
        d_i * d_i + d_j * d_j <= radius * radius
    }

    #[inline]
    fn wrapped(&self, i: u32, j: u32, di: i64, dj: i64) -> CellIndex {
        let w = self.width as i64;
        let h = self.height as i64;
        let ni = (i as i64 + di).rem_euclid(w) as u32;
        let nj = (j as i64 + dj).rem_euclid(h) as u32;
        self.index(ni, nj)
    }

    #[inline]
    fn index_or_reservoir(&self, i: i64, j: i64) -> CellIndex {
        if self.in_bounds(i, j) {
            self.index(i as u32, j as u32)
        } else {
            RESERVOIR
        }
    }
}
