//! Event histogram: value -> number of occurrences

use std::collections::BTreeMap;

use serde::Serialize;

/// Sorted histogram of integer events (avalanche sizes, grain totals, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EventCounter {
    events: BTreeMap<i64, u64>,
}

impl EventCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_event(&mut self, value: i64) {
        *self.events.entry(value).or_insert(0) += 1;
    }

    /// Occurrences of `value`.
    pub fn count(&self, value: i64) -> u64 {
        self.events.get(&value).copied().unwrap_or(0)
    }

    /// Sum of all occurrences.
    pub fn total(&self) -> u64 {
        self.events.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// `(value, occurrences)` in ascending value order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.events.iter().map(|(&v, &n)| (v, n))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_orders_events() {
        let mut c = EventCounter::new();
        for v in [5, 1, 5, 3, 5] {
            c.add_event(v);
        }
        assert_eq!(c.count(5), 3);
        assert_eq!(c.count(2), 0);
        assert_eq!(c.total(), 5);
        assert_eq!(c.iter().map(|(v, _)| v).collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(c.to_json(), r#"{"1":1,"3":1,"5":3}"#);
    }
}
