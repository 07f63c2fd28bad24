//! Outbound-adapter configuration, env-driven.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub base_url: String,
    pub secret_key: String,
    pub debug: bool,
}

impl PaymentConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("PAYSTACK_URL").unwrap_or_else(|_| "https://api.paystack.co".to_string()),
            secret_key: std::env::var("PAYSTACK_SECRET_KEY").unwrap_or_default(),
            debug: std::env::var("DEBUG").ok().map(|v| v == "1" || v == "true").unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub ticket_svc_target: String,
    pub user_svc_target: String,
    pub call_deadline: Duration,
}

impl RpcConfig {
    pub fn from_env() -> Self {
        Self {
            ticket_svc_target: std::env::var("GRPC_TICKET_SVC_TARGET")
                .unwrap_or_else(|_| "http://localhost:50051".to_string()),
            user_svc_target: std::env::var("GRPC_USER_SVC_TARGET")
                .unwrap_or_else(|_| "http://localhost:50052".to_string()),
            // 0.5s deadline for critical authority calls.
            call_deadline: Duration::from_millis(500),
        }
    }
}
