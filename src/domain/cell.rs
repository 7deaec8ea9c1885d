//! Cell - the atomic state unit of a sandpile grid

use rand::Rng;

use crate::domain::rules::Direction;

/// Grain counts are real-valued: stochastic splits hand out fractions.
pub type Grain = f64;

/// Row-major index of a cell in its grid.
pub type CellIndex = usize;

/// Index reserved for the reservoir cell. Outside every valid row-major index.
pub const RESERVOIR: CellIndex = CellIndex::MAX;

/// Capacity a fresh cell gets before any toppling configuration.
pub const DEFAULT_CAPACITY: Grain = 10.0;

/// Receives height changes of observed cells.
///
/// Registered per cell (see [`Cell::observe`]); the active-cell set of a
/// toppling is the only real implementation.
pub trait CellObserver {
    fn notify(&mut self, index: CellIndex, height: Grain);
}

/// Observer for callers that do not track activity.
pub struct Unobserved;

impl CellObserver for Unobserved {
    #[inline]
    fn notify(&mut self, _index: CellIndex, _height: Grain) {}
}

#[derive(Clone, Debug)]
pub struct Cell {
    height: Grain,
    max_capacity: Grain,
    direction: Direction,
    id: CellIndex,
    observed: bool,
}

impl Cell {
    /// New empty cell. The direction is drawn uniformly from the shared
    /// direction stream.
    pub fn new<R: Rng + ?Sized>(id: CellIndex, direction_rng: &mut R) -> Self {
        Cell {
            height: 0.0,
            max_capacity: DEFAULT_CAPACITY,
            direction: Direction::from_index(direction_rng.gen_range(0..4)),
            id,
            observed: false,
        }
    }

    #[inline]
    pub fn id(&self) -> CellIndex {
        self.id
    }

    #[inline]
    pub fn height(&self) -> Grain {
        self.height
    }

    #[inline]
    pub fn max_capacity(&self) -> Grain {
        self.max_capacity
    }

    #[inline]
    pub fn set_max_capacity(&mut self, capacity: Grain) {
        self.max_capacity = capacity;
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Register this cell for change notification.
    #[inline]
    pub fn observe(&mut self) {
        self.observed = true;
    }

    #[inline]
    pub fn is_observed(&self) -> bool {
        self.observed
    }

    /// Add `n` grains. Capacity is not enforced here.
    #[inline]
    pub fn increase(&mut self, n: Grain, observer: &mut dyn CellObserver) {
        self.height += n;
        self.notify(observer);
    }

    /// Remove `n` grains. May go below zero; callers decide.
    #[inline]
    pub fn decrease(&mut self, n: Grain, observer: &mut dyn CellObserver) {
        self.height -= n;
        self.notify(observer);
    }

    #[inline]
    pub fn clear(&mut self, observer: &mut dyn CellObserver) {
        self.height = 0.0;
        self.notify(observer);
    }

    /// Move up to `n` grains into `target`, bounded by what this cell holds
    /// and by the room left in `target`. Returns the amount moved (never
    /// negative).
    ///
    /// Unlike `increase`/`decrease` this does not notify observers.
    pub fn transfer(&mut self, target: &mut Cell, n: Grain) -> Grain {
        let amount = Self::transferable(self.height, target, n);
        self.height -= amount;
        target.height += amount;
        amount
    }

    /// `min(n, source_height, room in target)`, clamped at zero.
    #[inline]
    pub(crate) fn transferable(source_height: Grain, target: &Cell, n: Grain) -> Grain {
        let room = (target.max_capacity - target.height).max(0.0);
        n.min(source_height).min(room).max(0.0)
    }

    #[inline]
    fn notify(&self, observer: &mut dyn CellObserver) {
        if self.observed {
            observer.notify(self.id, self.height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::RngStreams;

    #[derive(Default)]
    struct Recorder(Vec<(CellIndex, Grain)>);

    impl CellObserver for Recorder {
        fn notify(&mut self, index: CellIndex, height: Grain) {
            self.0.push((index, height));
        }
    }

    fn cell(id: CellIndex) -> Cell {
        let mut streams = RngStreams::default();
        Cell::new(id, &mut streams.direction)
    }

    #[test]
    fn increase_and_decrease_notify_only_when_observed() {
        let mut rec = Recorder::default();
        let mut c = cell(7);

        c.increase(2.0, &mut rec);
        assert!(rec.0.is_empty());

        c.observe();
        c.increase(1.5, &mut rec);
        c.decrease(0.5, &mut rec);
        c.clear(&mut rec);
        assert_eq!(rec.0, vec![(7, 3.5), (7, 3.0), (7, 0.0)]);
    }

    #[test]
    fn increase_ignores_capacity() {
        let mut c = cell(0);
        c.increase(DEFAULT_CAPACITY * 3.0, &mut Unobserved);
        assert_eq!(c.height(), 30.0);
    }

    #[test]
    fn transfer_is_bounded_by_source_and_target_room() {
        let mut a = cell(0);
        let mut b = cell(1);
        a.increase(3.0, &mut Unobserved);
        b.set_max_capacity(5.0);
        b.increase(4.0, &mut Unobserved);

        assert_eq!(a.transfer(&mut b, 2.0), 1.0);
        assert_eq!(a.height(), 2.0);
        assert_eq!(b.height(), 5.0);

        // full target, nothing moves
        assert_eq!(a.transfer(&mut b, 2.0), 0.0);
    }

    #[test]
    fn transfer_from_empty_or_into_overfull_moves_nothing() {
        let mut a = cell(0);
        let mut b = cell(1);
        assert_eq!(a.transfer(&mut b, 1.0), 0.0);

        a.increase(2.0, &mut Unobserved);
        b.increase(DEFAULT_CAPACITY + 4.0, &mut Unobserved);
        assert_eq!(a.transfer(&mut b, 1.0), 0.0);
        assert_eq!(a.height(), 2.0);
    }

    #[test]
    fn transfer_does_not_notify() {
        let mut rec = Recorder::default();
        let mut a = cell(0);
        let mut b = cell(1);
        a.observe();
        b.observe();
        a.increase(1.0, &mut rec);
        rec.0.clear();

        a.transfer(&mut b, 1.0);
        assert!(rec.0.is_empty());
        assert_eq!(b.height(), 1.0);
    }
}
