use std::fmt;

use super::*;

/// Diagnostic dump: total grains, then one row of rounded heights per line.
/// Gets unwieldy beyond roughly 60x60.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid size = {}", self.count_grains())?;
        for row in self.cells.chunks(self.width as usize) {
            for cell in row {
                write!(f, "{:.0} ", cell.height())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
