use std::ops::Deref;

use crate::domain::cell::{CellIndex, RESERVOIR};

/// Up to four neighbour indices, in North, West, South, East slot order
/// where the topology defines directions. May repeat `RESERVOIR`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbours {
    slots: [CellIndex; 4],
    len: u8,
}

impl Neighbours {
    pub const CAPACITY: usize = 4;

    #[inline]
    pub fn new() -> Self {
        Neighbours {
            slots: [RESERVOIR; 4],
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, idx: CellIndex) {
        debug_assert!((self.len as usize) < Self::CAPACITY, "neighbour list full");
        self.slots[self.len as usize] = idx;
        self.len += 1;
    }

    #[inline]
    pub fn as_slice(&self) -> &[CellIndex] {
        &self.slots[..self.len as usize]
    }

    /// Slots that resolve to the reservoir.
    pub fn reservoir_count(&self) -> usize {
        self.as_slice().iter().filter(|&&n| n == RESERVOIR).count()
    }
}

impl Default for Neighbours {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Neighbours {
    type Target = [CellIndex];

    #[inline]
    fn deref(&self) -> &[CellIndex] {
        self.as_slice()
    }
}
