//! Scheduled-settlement worker: polls for `scheduled`
//! transactions whose `delayed_settlement_until` has come due and resettles
//! them. A per-item failure is logged and the loop moves on to the next
//! batch rather than aborting, so one bad row never takes the whole
//! poller down.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use ticketledger_db::TransactionRepository;

use crate::config::SchedulerConfig;
use crate::settle_ticket_purchase::SettleTicketPurchase;

pub struct ScheduledSettlementWorker {
    transactions: Arc<TransactionRepository>,
    settle: Arc<SettleTicketPurchase>,
    config: SchedulerConfig,
}

impl ScheduledSettlementWorker {
    pub fn new(transactions: Arc<TransactionRepository>, settle: Arc<SettleTicketPurchase>, config: SchedulerConfig) -> Self {
        Self { transactions, settle, config }
    }

    /// Runs until the process is torn down. Intended to be spawned as its
    /// own task by the server binary.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));
        loop {
            ticker.tick().await;
            if let Err(err) = self.poll_once().await {
                error!(error = %err, "scheduled-settlement poll failed, will retry next tick");
            }
        }
    }

    async fn poll_once(&self) -> Result<(), ticketledger_db::DbError> {
        let due = self.transactions.find_due_scheduled(self.config.batch_size).await?;
        if due.is_empty() {
            return Ok(());
        }
        info!(count = due.len(), "settling due scheduled transactions");
        for txn in due {
            if let Err(err) = self.settle.execute(&txn.reference).await {
                warn!(reference = %txn.reference, error = %err, "scheduled settlement failed, will retry on next poll");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_the_documented_poll_window() {
        let config = SchedulerConfig::default();
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.poll_interval_secs, 60);
    }
}
