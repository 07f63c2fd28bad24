//! Pure domain logic for transaction settlement: charge schedule evaluation
//! and recipient-split computation. No I/O, no async - the repositories and
//! use cases in the other crates drive these functions and persist what they
//! return.

pub mod evaluator;
pub mod id;
pub mod settlement_split;

pub use evaluator::{evaluate, pick_active_version, ChargeBreakdown};
pub use settlement_split::{compute_purchase_splits, ReferrerInfo};
