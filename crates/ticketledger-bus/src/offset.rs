//! Consumer-group offset tracking.
//!
//! There is no disk-backed log behind this bus, so "replay on restart"
//! means: within a running process, a message that fails its handlers is
//! never marked committed, so the high-water mark for that partition stops
//! advancing past it and `committed_offset` keeps reporting the last good
//! position. A real Kafka-backed consumer would re-poll from there; this
//! one logs the gap instead, which is the honest behavior for a queue with
//! no persistence to replay from.

use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct OffsetTable {
    committed: Mutex<HashMap<(String, usize), u64>>,
}

impl OffsetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed_offset(&self, group: &str, partition: usize) -> u64 {
        self.committed
            .lock()
            .get(&(group.to_string(), partition))
            .copied()
            .unwrap_or(0)
    }

    /// Advance the committed offset. No-ops if `offset` would move it
    /// backwards - commits only ever move forward.
    pub fn commit(&self, group: &str, partition: usize, offset: u64) {
        let mut table = self.committed.lock();
        let entry = table.entry((group.to_string(), partition)).or_insert(0);
        if offset > *entry {
            *entry = offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let table = OffsetTable::new();
        assert_eq!(table.committed_offset("g1", 0), 0);
    }

    #[test]
    fn commit_advances_forward_only() {
        let table = OffsetTable::new();
        table.commit("g1", 0, 5);
        table.commit("g1", 0, 3);
        assert_eq!(table.committed_offset("g1", 0), 5);
        table.commit("g1", 0, 9);
        assert_eq!(table.committed_offset("g1", 0), 9);
    }

    #[test]
    fn groups_and_partitions_are_independent() {
        let table = OffsetTable::new();
        table.commit("g1", 0, 5);
        assert_eq!(table.committed_offset("g2", 0), 0);
        assert_eq!(table.committed_offset("g1", 1), 0);
    }
}
