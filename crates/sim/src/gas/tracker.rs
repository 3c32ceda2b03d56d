// This file is part of Warden.
//
// Warden is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Warden is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Warden.
// If not, see https://www.gnu.org/licenses/.

use std::collections::VecDeque;

/// One observed price, bucketed to the second it was seen in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Observation {
    price: u128,
    timestamp_ms: u64,
}

/// A bounded queue of per-second price minima.
///
/// At most one entry exists per second: an observation landing within a
/// second of the tail overwrites it only when cheaper, so each entry is the
/// minimum seen in its second. Capacity equals the validity window in
/// seconds; the oldest bucket is evicted first.
#[derive(Clone, Debug)]
pub(crate) struct RollingMinimum {
    entries: VecDeque<Observation>,
    capacity: usize,
}

impl RollingMinimum {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn record(&mut self, price: u128, now_ms: u64) {
        match self.entries.back_mut() {
            Some(last) if now_ms.saturating_sub(last.timestamp_ms) < 1000 => {
                if price < last.price {
                    *last = Observation {
                        price,
                        timestamp_ms: now_ms,
                    };
                }
            }
            _ => {
                self.entries.push_back(Observation {
                    price,
                    timestamp_ms: now_ms,
                });
                if self.entries.len() > self.capacity {
                    self.entries.pop_front();
                }
            }
        }
    }

    pub(crate) fn minimum(&self) -> Option<u128> {
        self.entries.iter().map(|o| o.price).min()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_second_keeps_minimum() {
        let mut tracker = RollingMinimum::new(10);
        tracker.record(10, 0);
        tracker.record(8, 500);
        tracker.record(12, 1500);

        // The cheaper same-second price overwrote the tail in place; the
        // next second opened a new bucket.
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.minimum(), Some(8));
    }

    #[test]
    fn test_same_second_ignores_higher_price() {
        let mut tracker = RollingMinimum::new(10);
        tracker.record(10, 0);
        tracker.record(11, 900);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.minimum(), Some(10));
    }

    #[test]
    fn test_capacity_bound() {
        let mut tracker = RollingMinimum::new(3);
        for i in 0..10_u64 {
            tracker.record(100 - i as u128, i * 1000);
        }
        assert_eq!(tracker.len(), 3);
        // Only the last three seconds survive.
        assert_eq!(tracker.minimum(), Some(91));
    }

    #[test]
    fn test_eviction_raises_minimum() {
        let mut tracker = RollingMinimum::new(2);
        tracker.record(5, 0);
        tracker.record(20, 1000);
        tracker.record(30, 2000);
        assert_eq!(tracker.minimum(), Some(20));
    }

    #[test]
    fn test_empty() {
        let tracker = RollingMinimum::new(10);
        assert!(tracker.is_empty());
        assert_eq!(tracker.minimum(), None);
    }
}
