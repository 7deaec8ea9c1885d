//! Active-cell set for the FollowActivity strategy
//!
//! One bit per grid cell. Fed push-style through `CellObserver` by every
//! observed cell mutation; drained once per pass.

use crate::domain::cell::{CellIndex, CellObserver, Grain};
use crate::spatial::grid::Grid;

pub struct ActiveSet {
    bits: Vec<u64>,
    capacity: usize,
    threshold: Grain,
    tracking: bool,
}

impl ActiveSet {
    pub fn new(capacity: usize, threshold: Grain, tracking: bool) -> Self {
        Self {
            bits: vec![0; (capacity + 63) / 64],
            capacity,
            threshold,
            tracking,
        }
    }

    // === BitSet Helpers ===

    #[inline(always)]
    fn set_bit(bits: &mut [u64], idx: usize) {
        let word = idx >> 6;
        let bit = idx & 63;
        if word < bits.len() {
            bits[word] |= 1u64 << bit;
        }
    }

    #[inline(always)]
    fn clear_bit(bits: &mut [u64], idx: usize) {
        let word = idx >> 6;
        let bit = idx & 63;
        if word < bits.len() {
            bits[word] &= !(1u64 << bit);
        }
    }

    #[inline(always)]
    fn check_bit(bits: &[u64], idx: usize) -> bool {
        let word = idx >> 6;
        let bit = idx & 63;
        word < bits.len() && (bits[word] & (1u64 << bit)) != 0
    }

    // === Queries ===

    #[inline]
    pub fn contains(&self, idx: CellIndex) -> bool {
        Self::check_bit(&self.bits, idx)
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    // === Maintenance ===

    /// Move every member into `out` (ascending index) and leave the set empty.
    /// Cells toppled afterwards re-enter through notifications.
    pub fn drain_into(&mut self, out: &mut Vec<CellIndex>) {
        out.clear();
        for (w, word) in self.bits.iter_mut().enumerate() {
            let mut bits = *word;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                out.push((w << 6) | bit);
                bits &= bits - 1;
            }
            *word = 0;
        }
    }

    /// Recompute membership from the grid's current heights.
    pub fn rebuild(&mut self, grid: &Grid) {
        self.bits.iter_mut().for_each(|w| *w = 0);
        if !self.tracking {
            return;
        }
        for (idx, cell) in grid.cells().iter().enumerate() {
            if cell.is_observed() && cell.height() >= self.threshold {
                Self::set_bit(&mut self.bits, idx);
            }
        }
    }

    pub fn set_threshold(&mut self, threshold: Grain) {
        self.threshold = threshold;
    }

    pub fn set_tracking(&mut self, tracking: bool) {
        self.tracking = tracking;
    }
}

impl CellObserver for ActiveSet {
    #[inline]
    fn notify(&mut self, index: CellIndex, height: Grain) {
        if !self.tracking || index >= self.capacity {
            return;
        }
        if height < self.threshold {
            Self::clear_bit(&mut self.bits, index);
        } else {
            Self::set_bit(&mut self.bits, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::RESERVOIR;

    #[test]
    fn notify_inserts_at_threshold_and_removes_below() {
        let mut set = ActiveSet::new(130, 4.0, true);
        set.notify(129, 4.0);
        set.notify(3, 5.5);
        set.notify(7, 3.9);
        assert!(set.contains(129));
        assert!(set.contains(3));
        assert!(!set.contains(7));
        assert_eq!(set.len(), 2);

        set.notify(3, 0.0);
        assert!(!set.contains(3));
    }

    #[test]
    fn drain_is_ascending_and_empties() {
        let mut set = ActiveSet::new(200, 1.0, true);
        for idx in [150, 2, 64, 63] {
            set.notify(idx, 1.0);
        }
        let mut out = Vec::new();
        set.drain_into(&mut out);
        assert_eq!(out, vec![2, 63, 64, 150]);
        assert!(set.is_empty());
    }

    #[test]
    fn reservoir_and_untracked_notifications_are_ignored() {
        let mut set = ActiveSet::new(16, 1.0, true);
        set.notify(RESERVOIR, 100.0);
        assert!(set.is_empty());

        let mut idle = ActiveSet::new(16, 1.0, false);
        idle.notify(4, 100.0);
        assert!(idle.is_empty());
    }
}
