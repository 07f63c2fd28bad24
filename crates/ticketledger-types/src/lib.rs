//! Canonical domain types for the ticket settlement engine.
//!
//! Zero dependencies on other `ticketledger` crates. Defines the Transaction
//! and Wallet aggregates, the domain-event envelope, the read-only charge
//! schedule model, and the engine-wide error taxonomy.

pub mod charge;
pub mod error;
pub mod events;
pub mod money;
pub mod transaction;
pub mod wallet;

pub use charge::*;
pub use error::*;
pub use events::*;
pub use money::*;
pub use transaction::*;
pub use wallet::*;

/// Schema version of the ticketledger domain types, bumped on breaking
/// changes to the wire/storage representation of `Transaction`/`Wallet`.
pub const TYPES_VERSION: &str = "0.1.0";
