use cast::i128;
use soroban_sdk::{panic_with_error, Env};

use crate::{
    errors::PoolError,
    math::{checked_add, checked_mul},
    storage::{self, TwUrEntry},
};

/// A fixed capacity ring of cumulative utilization samples for a reserve. Entries are addressed
/// by a logical index that only grows; the physical slot is the logical index modulo capacity.
pub struct UtilizationRing {
    reserve_id: u32,
    capacity: u32,
    next_index: u32,
}

impl UtilizationRing {
    /// Load the ring for a reserve
    ///
    /// ### Arguments
    /// * `reserve_id` - The index of the reserve
    /// * `capacity` - The number of entries retained by the ring
    pub fn load(e: &Env, reserve_id: u32, capacity: u32) -> Self {
        UtilizationRing {
            reserve_id,
            capacity,
            next_index: storage::get_tw_index(e, reserve_id),
        }
    }

    /// Create the ring for a newly registered reserve with a zero entry at `timestamp`
    ///
    /// ### Arguments
    /// * `reserve_id` - The index of the reserve
    /// * `capacity` - The number of entries retained by the ring
    /// * `timestamp` - The registration time of the reserve
    pub fn initialize(e: &Env, reserve_id: u32, capacity: u32, timestamp: u64) -> Self {
        let entry = TwUrEntry {
            timestamp,
            accumulator: 0,
        };
        storage::set_tw_entry(e, reserve_id, 0, &entry);
        storage::set_tw_index(e, reserve_id, 1);
        UtilizationRing {
            reserve_id,
            capacity,
            next_index: 1,
        }
    }

    /// The logical index the next entry will be written to
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// The logical index of the most recent entry
    pub fn latest_index(&self) -> u32 {
        self.next_index.saturating_sub(1)
    }

    /// The number of entries the ring retains
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// The logical index of the oldest retained entry
    pub fn oldest_index(&self) -> u32 {
        self.next_index.saturating_sub(self.capacity)
    }

    /// Check if a logical index is retained by the ring
    pub fn contains(&self, index: u32) -> bool {
        index >= self.oldest_index() && index < self.next_index
    }

    /// Fetch the entry at a logical index, or None if it is not retained
    pub fn get(&self, e: &Env, index: u32) -> Option<TwUrEntry> {
        if !self.contains(index) {
            return None;
        }
        storage::get_tw_entry(e, self.reserve_id, index % self.capacity)
    }

    fn get_retained(&self, e: &Env, index: u32) -> TwUrEntry {
        match self.get(e, index) {
            Some(entry) => entry,
            None => panic_with_error!(e, PoolError::WrongIndex),
        }
    }

    /// Append the utilization that held since the latest entry. Timestamps not after the
    /// latest entry are ignored.
    ///
    /// ### Arguments
    /// * `timestamp` - The time the utilization held until
    /// * `utilization` - The utilization since the latest entry (6 decimals)
    pub fn record(&mut self, e: &Env, timestamp: u64, utilization: i128) {
        let latest = self.get_retained(e, self.latest_index());
        if timestamp <= latest.timestamp {
            return;
        }
        let elapsed = i128(timestamp - latest.timestamp);
        let entry = TwUrEntry {
            timestamp,
            accumulator: checked_add(e, latest.accumulator, checked_mul(e, utilization, elapsed)),
        };
        storage::set_tw_entry(e, self.reserve_id, self.next_index % self.capacity, &entry);
        self.next_index += 1;
        storage::set_tw_index(e, self.reserve_id, self.next_index);
    }

    /// Calculate the time weighted average utilization between two entries
    ///
    /// ### Arguments
    /// * `from` - The logical index of the entry starting the window
    /// * `to` - The logical index of the entry ending the window
    ///
    /// ### Returns
    /// The (average utilization, window length in seconds)
    ///
    /// ### Panics
    /// If either entry is not retained or `to` is not strictly after `from`
    pub fn time_weighted_average(&self, e: &Env, from: u32, to: u32) -> (i128, u64) {
        let from_entry = self.get_retained(e, from);
        let to_entry = self.get_retained(e, to);
        if to_entry.timestamp <= from_entry.timestamp {
            panic_with_error!(e, PoolError::WrongIndex);
        }
        let window = to_entry.timestamp - from_entry.timestamp;
        (
            (to_entry.accumulator - from_entry.accumulator) / i128(window),
            window,
        )
    }

    /// Find the oldest retained entry with a timestamp at or after `timestamp`
    ///
    /// ### Panics
    /// If every retained entry is older than `timestamp`
    pub fn find_first_at_or_after(&self, e: &Env, timestamp: u64) -> u32 {
        let mut low = self.oldest_index();
        let mut high = self.next_index;
        while low < high {
            let mid = low + (high - low) / 2;
            if self.get_retained(e, mid).timestamp < timestamp {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        if low == self.next_index {
            panic_with_error!(e, PoolError::WrongIndex);
        }
        low
    }

    /// Require that `index` is the oldest retained entry with a timestamp at or after `timestamp`
    ///
    /// ### Panics
    /// If the entry is not retained, is older than `timestamp`, or a newer entry than it
    /// also satisfies the bound
    pub fn require_first_at_or_after(&self, e: &Env, index: u32, timestamp: u64) {
        if self.get_retained(e, index).timestamp < timestamp {
            panic_with_error!(e, PoolError::WrongIndex);
        }
        if index > self.oldest_index() && self.get_retained(e, index - 1).timestamp >= timestamp {
            panic_with_error!(e, PoolError::WrongIndex);
        }
    }
}
