//! bcrypt hashing for the Wallet aggregate's transaction PIN. The PIN itself
//! is always validated (4 digits) by `ticketledger_types::Wallet` before it
//! reaches this module; this module only ever sees and stores the hash.

use bcrypt::{hash, verify, DEFAULT_COST};

use ticketledger_types::{EngineError, Result};

pub fn hash_pin(pin: &str) -> Result<String> {
    hash(pin, DEFAULT_COST).map_err(|e| EngineError::internal(format!("pin hashing failed: {e}")))
}

pub fn verify_pin(pin: &str, hash: &str) -> Result<bool> {
    verify(pin, hash).map_err(|e| EngineError::internal(format!("pin verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hashed = hash_pin("1234").unwrap();
        assert!(verify_pin("1234", &hashed).unwrap());
        assert!(!verify_pin("4321", &hashed).unwrap());
    }

    #[test]
    fn hash_never_stores_plaintext() {
        let hashed = hash_pin("1234").unwrap();
        assert_ne!(hashed, "1234");
    }
}
