//! Repository implementations

mod charge;
mod transaction;
mod wallet;

pub use charge::ChargeScheduleRepository;
pub use transaction::TransactionRepository;
pub use wallet::WalletRepository;
