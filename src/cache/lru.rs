//! Recency Tracker
//!
//! Orders cache keys by last use so a bounded cache can drop the coldest one.

use std::collections::{BTreeMap, HashMap};

// == Recency Tracker ==
/// Tracks last-use order with a monotonically increasing tick.
///
/// `by_tick` is ordered oldest first; `ticks` maps each key back to its slot.
#[derive(Debug, Default)]
pub struct RecencyTracker {
    by_tick: BTreeMap<u64, String>,
    ticks: HashMap<String, u64>,
    next_tick: u64,
}

impl RecencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks `key` as the most recently used.
    pub fn touch(&mut self, key: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;

        match self.ticks.get_mut(key) {
            Some(old) => {
                self.by_tick.remove(&*old);
                *old = tick;
            }
            None => {
                self.ticks.insert(key.to_string(), tick);
            }
        }
        self.by_tick.insert(tick, key.to_string());
    }

    // == Forget ==
    pub fn forget(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    // == Pop Coldest ==
    /// Removes and returns the least recently used key.
    pub fn pop_coldest(&mut self) -> Option<String> {
        let (_, key) = self.by_tick.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
