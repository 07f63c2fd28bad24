//! Engine-wide settlement configuration, env-driven.
//! Follows the same `from_env()` style
//! (`std::env::var(...).ok().and_then(|s| s.parse().ok()).unwrap_or(default)`)
//! already used by `ticketledger-db::DatabaseConfig` and
//! `ticketledger-adapters::{PaymentConfig, RpcConfig}`.

use ticketledger_types::Money;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub settlement_delay_hours: i64,
    pub auto_withdrawal_enabled: bool,
    pub max_wallet_balance: Option<Money>,
    pub charge_req_key: String,
    pub account_validation_key: String,
    pub debug: bool,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            settlement_delay_hours: std::env::var("SETTLEMENT_DELAY_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            auto_withdrawal_enabled: std::env::var("AUTO_WITHDRAWAL_ENABLED")
                .ok()
                .map(|s| s == "1")
                .unwrap_or(false),
            max_wallet_balance: std::env::var("MAX_WALLET_BALANCE")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Money::new),
            charge_req_key: std::env::var("CHARGE_REQ_KEY").unwrap_or_default(),
            account_validation_key: std::env::var("ACCOUNT_VALIDATION_KEY").unwrap_or_default(),
            debug: std::env::var("DEBUG").ok().map(|v| v == "1" || v == "true").unwrap_or(false),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settlement_delay_hours: 0,
            auto_withdrawal_enabled: false,
            max_wallet_balance: None,
            charge_req_key: String::new(),
            account_validation_key: String::new(),
            debug: false,
        }
    }
}

/// Poll cadence for [`crate::scheduler::ScheduledSettlementWorker`].
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub poll_interval_secs: u64,
    pub batch_size: i64,
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            poll_interval_secs: std::env::var("TICKETLEDGER__SCHEDULER__POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            batch_size: std::env::var("TICKETLEDGER__SCHEDULER__BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { poll_interval_secs: 60, batch_size: 20 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_disable_delay_and_auto_withdrawal() {
        let config = EngineConfig::default();
        assert_eq!(config.settlement_delay_hours, 0);
        assert!(!config.auto_withdrawal_enabled);
        assert!(config.max_wallet_balance.is_none());
    }

    #[test]
    fn scheduler_defaults_match_the_documented_poll_window() {
        let config = SchedulerConfig::default();
        assert_eq!(config.poll_interval_secs, 60);
        assert_eq!(config.batch_size, 20);
    }
}
