//! Request handlers, one module per endpoint group.

pub mod admin;
pub mod charges;
pub mod checkout;
pub mod health;
pub mod wallet;
pub mod webhook;

pub use health::*;
