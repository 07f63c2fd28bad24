//! Partition assignment. The teacher has no analogue for this - it is the
//! one piece of `ticketledger-bus` with no direct grounding file, since
//! nothing in the example corpus routes messages by key.

/// FNV-1a, good enough for an even spread over a handful of partitions and
/// stable across process restarts (unlike `DefaultHasher`, which is seeded
/// per-process).
fn fnv1a(key: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    key.bytes().fold(OFFSET_BASIS, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
}

/// All events sharing `aggregate_id` land on the same partition, so a
/// single consumer processes them in publish order.
pub fn partition_of(aggregate_id: &str, partitions: usize) -> usize {
    assert!(partitions > 0, "partition count must be positive");
    (fnv1a(aggregate_id) % partitions as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_partition() {
        assert_eq!(partition_of("txn_abc", 8), partition_of("txn_abc", 8));
    }

    #[test]
    fn spreads_across_partitions() {
        let assigned: std::collections::HashSet<usize> = (0..200)
            .map(|i| partition_of(&format!("txn_{i}"), 8))
            .collect();
        assert!(assigned.len() > 1);
    }

    #[test]
    fn in_range() {
        for i in 0..50 {
            assert!(partition_of(&format!("txn_{i}"), 4) < 4);
        }
    }
}
