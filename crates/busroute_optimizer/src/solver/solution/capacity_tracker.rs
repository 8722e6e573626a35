use crate::problem::capacity::Capacity;

/// Cumulative demand along a tour.
///
/// `fwd_loads[i]` is the load picked up by the first `i` stops, so
/// `fwd_loads[0] == 0` and the last entry is the tour load. Every feasibility
/// query is O(1); updates are linear in the tour length.
#[derive(Debug, Clone)]
pub struct CapacityTracker {
    capacity: Capacity,
    fwd_loads: Vec<u64>,
}

impl CapacityTracker {
    pub fn new(capacity: Capacity) -> Self {
        CapacityTracker {
            capacity,
            fwd_loads: vec![0],
        }
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    #[inline]
    pub fn load(&self) -> u64 {
        self.fwd_loads[self.fwd_loads.len() - 1]
    }

    pub fn remaining(&self) -> u64 {
        self.capacity.slack(self.load())
    }

    /// Can a stop with `demand` join the tour without exceeding capacity.
    /// A load that does not fit in a `u64` never does.
    #[inline]
    pub fn can_add(&self, demand: u64) -> bool {
        self.load()
            .checked_add(demand)
            .is_some_and(|load| self.capacity.is_satisfied(load))
    }

    /// Load of the stops in positions `start..end`.
    #[inline]
    pub fn segment_load(&self, start: usize, end: usize) -> u64 {
        self.fwd_loads[end] - self.fwd_loads[start]
    }

    /// Load of the first `position` stops.
    #[inline]
    pub fn head_load(&self, position: usize) -> u64 {
        self.fwd_loads[position]
    }

    /// Load of the stops from `position` to the end of the tour.
    #[inline]
    pub fn tail_load(&self, position: usize) -> u64 {
        self.load() - self.fwd_loads[position]
    }

    /// Would the tour stay feasible if the stops in `start..end` were replaced
    /// by stops totalling `added_load`.
    #[inline]
    pub fn can_replace(&self, start: usize, end: usize, added_load: u64) -> bool {
        let load = self.load() - self.segment_load(start, end);
        load.checked_add(added_load)
            .is_some_and(|load| self.capacity.is_satisfied(load))
    }

    pub fn is_feasible(&self) -> bool {
        self.capacity.is_satisfied(self.load())
    }

    pub fn on_insert(&mut self, position: usize, demand: u64) {
        let before = self.fwd_loads[position];
        self.fwd_loads.insert(position + 1, before.saturating_add(demand));
        for load in &mut self.fwd_loads[position + 2..] {
            *load = load.saturating_add(demand);
        }
    }

    pub fn on_remove(&mut self, position: usize) {
        let demand = self.segment_load(position, position + 1);
        self.fwd_loads.remove(position + 1);
        for load in &mut self.fwd_loads[position + 1..] {
            *load -= demand;
        }
    }

    /// Recomputes the cumulative loads from the demands in tour order.
    pub fn rebuild<I>(&mut self, demands: I)
    where
        I: IntoIterator<Item = u64>,
    {
        self.fwd_loads.clear();
        self.fwd_loads.push(0);

        let mut load: u64 = 0;
        for demand in demands {
            load = load.saturating_add(demand);
            self.fwd_loads.push(load);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(capacity: u64, demands: &[u64]) -> CapacityTracker {
        let mut tracker = CapacityTracker::new(Capacity::new(capacity));
        tracker.rebuild(demands.iter().copied());
        tracker
    }

    #[test]
    fn test_empty_tracker() {
        let tracker = CapacityTracker::new(Capacity::new(5));
        assert_eq!(tracker.load(), 0);
        assert_eq!(tracker.remaining(), 5);
        assert!(tracker.can_add(5));
        assert!(!tracker.can_add(6));
    }

    #[test]
    fn test_segment_loads() {
        let tracker = tracker(10, &[2, 3, 1]);

        assert_eq!(tracker.load(), 6);
        assert_eq!(tracker.segment_load(1, 3), 4);
        assert_eq!(tracker.head_load(1), 2);
        assert_eq!(tracker.tail_load(1), 4);
        assert!(tracker.can_add(4));
        assert!(!tracker.can_add(5));
        assert!(tracker.can_replace(0, 1, 6));
        assert!(!tracker.can_replace(0, 1, 7));
    }

    #[test]
    fn test_insert_and_remove() {
        let mut tracker = tracker(10, &[2, 3]);

        tracker.on_insert(1, 4);
        assert_eq!(tracker.load(), 9);
        assert_eq!(tracker.segment_load(1, 2), 4);
        assert_eq!(tracker.segment_load(2, 3), 3);

        tracker.on_remove(0);
        assert_eq!(tracker.load(), 7);
        assert_eq!(tracker.head_load(1), 4);

        tracker.on_insert(2, 1);
        assert_eq!(tracker.load(), 8);
        assert_eq!(tracker.tail_load(2), 1);
    }

    #[test]
    fn test_unlimited_capacity() {
        let tracker = tracker(u64::MAX, &[u64::MAX / 2]);
        assert!(tracker.can_add(u64::MAX / 2));
        assert!(tracker.is_feasible());
    }

    #[test]
    fn test_overflowing_load_is_rejected() {
        let tracker = tracker(u64::MAX, &[u64::MAX]);

        assert!(!tracker.can_add(1));
        assert!(tracker.can_add(0));
        assert!(!tracker.can_replace(1, 1, 1));
        assert!(tracker.can_replace(0, 1, u64::MAX));
    }
}
