//! Outbound integrations: the payment provider and the ticket/user RPC
//! stubs, both run behind a shared circuit breaker.

pub mod circuit_breaker;
pub mod config;
pub mod payment;
pub mod rpc;

pub use circuit_breaker::CircuitBreaker;
pub use config::{PaymentConfig, RpcConfig};
pub use payment::{BankItem, ExternalTransaction, PaymentAdapter, PersonalAccount, PaystackAdapter};
pub use rpc::{HttpTicketService, HttpUserService, TicketService, UserService};
