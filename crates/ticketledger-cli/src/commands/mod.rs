//! One module per CLI subcommand group.

pub mod health;
pub mod transactions;
