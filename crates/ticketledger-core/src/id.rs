//! Reference and id generation. References are ULIDs: lexicographically
//! sortable, so a scan of `reference` order is also creation order — useful
//! for the scheduled-settlement worker's due-transaction scan.

use ulid::Ulid;

pub fn new_reference(prefix: &str) -> String {
    format!("{prefix}_{}", Ulid::new())
}

pub fn new_id() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_carries_prefix() {
        let r = new_reference("txn");
        assert!(r.starts_with("txn_"));
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }
}
