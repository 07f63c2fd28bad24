//! `UpdateTransactionStatus`: the admin-only status
//! override. Exactly two whitelisted transitions exist - everything else,
//! including any attempt against a non-manual-withdrawal transaction, is
//! rejected with `UnsupportedAdminTransition` rather than silently no-op'd.

use chrono::Utc;
use std::fmt;
use std::sync::Arc;

use ticketledger_bus::EventBus;
use ticketledger_core::id::new_id;
use ticketledger_db::{TransactionRepository, WalletRepository};
use ticketledger_types::{EngineError, Result, SettlementStatus, TransactionType};

use crate::support::wrap_db;

#[derive(Debug, Clone)]
pub enum AdminTransition {
    Failed { reason: String },
    Completed,
}

impl fmt::Display for AdminTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminTransition::Failed { .. } => write!(f, "failed"),
            AdminTransition::Completed => write!(f, "completed"),
        }
    }
}

pub struct UpdateTransactionStatus {
    transactions: Arc<TransactionRepository>,
    wallets: Arc<WalletRepository>,
    bus: EventBus,
}

impl UpdateTransactionStatus {
    pub fn new(transactions: Arc<TransactionRepository>, wallets: Arc<WalletRepository>, bus: EventBus) -> Self {
        Self { transactions, wallets, bus }
    }

    pub async fn execute(&self, reference: &str, transition: AdminTransition) -> Result<()> {
        let mut db_tx = self.transactions.begin().await.map_err(wrap_db)?;
        let mut txn = self
            .transactions
            .lock_by_reference(&mut db_tx, reference)
            .await
            .map_err(wrap_db)?
            .ok_or_else(|| EngineError::TransactionNotFound { reference: reference.to_string() })?;

        let is_manual_withdrawal = txn.transaction_type == TransactionType::Withdrawal
            && txn.metadata.get("mode").map(String::as_str) == Some("manual")
            && txn.settlement_status == SettlementStatus::Pending;

        if !is_manual_withdrawal {
            return Err(EngineError::UnsupportedAdminTransition { attempted: transition.to_string() });
        }

        match transition {
            AdminTransition::Failed { reason } => {
                let refundable = txn.mark_as_failed(reason)?;
                let mut wallet = self
                    .wallets
                    .lock_or_create(&mut db_tx, &txn.user_id, new_id)
                    .await
                    .map_err(wrap_db)?;
                wallet.deposit(refundable, None)?;
                self.wallets.update(&mut db_tx, &wallet).await.map_err(wrap_db)?;
            }
            AdminTransition::Completed => {
                txn.set_metadata("completed_at", Utc::now().to_rfc3339());
                txn.complete_settlement()?;
            }
        }

        self.transactions.update(&mut db_tx, &txn).await.map_err(wrap_db)?;
        db_tx.commit().await.map_err(|e| wrap_db(e.into()))?;

        for event in txn.take_events() {
            let _ = self.bus.publish(event);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_display_matches_the_admin_status_string() {
        assert_eq!(AdminTransition::Completed.to_string(), "completed");
        assert_eq!(AdminTransition::Failed { reason: "x".into() }.to_string(), "failed");
    }
}
