//! `CompleteWithdrawal`: finishes a withdrawal once the
//! payment provider's `transfer.success` webhook confirms the transfer
//! landed. Triggered either directly by the webhook-ingest HTTP handler or,
//! when the webhook is translated onto the bus, by
//! [`crate::event_handler::SettlementEventRouter`] on a
//! `WithdrawalCompleted` event.

use chrono::Utc;
use std::sync::Arc;

use ticketledger_bus::EventBus;
use ticketledger_db::TransactionRepository;
use ticketledger_types::{EngineError, Money, Result, SettlementStatus, TransactionType};

use crate::support::wrap_db;

pub struct CompleteWithdrawalInput {
    pub reference: String,
    pub amount: Money,
    /// Destination account string lifted from the webhook payload, if the
    /// provider included one; manual-mode withdrawals already have
    /// `metadata.dest` set by dispatch, so this is only needed for the
    /// auto-withdrawal path.
    pub dest: Option<String>,
}

pub struct CompleteWithdrawal {
    transactions: Arc<TransactionRepository>,
    bus: EventBus,
}

impl CompleteWithdrawal {
    pub fn new(transactions: Arc<TransactionRepository>, bus: EventBus) -> Self {
        Self { transactions, bus }
    }

    pub async fn execute(&self, input: CompleteWithdrawalInput) -> Result<()> {
        let mut db_tx = self.transactions.begin().await.map_err(wrap_db)?;
        let mut txn = self
            .transactions
            .lock_by_reference(&mut db_tx, &input.reference)
            .await
            .map_err(wrap_db)?
            .ok_or_else(|| EngineError::TransactionNotFound { reference: input.reference.clone() })?;

        if txn.transaction_type != TransactionType::Withdrawal {
            return Err(EngineError::UnsupportedAdminTransition { attempted: "complete_withdrawal_wrong_type".into() });
        }
        if !matches!(txn.settlement_status, SettlementStatus::Pending | SettlementStatus::Processing) {
            // Already completed on a previous, at-least-once delivery.
            return Ok(());
        }
        if txn.amount != input.amount {
            return Err(EngineError::WithdrawalAmountMismatch {
                reference: input.reference.clone(),
                expected: txn.amount.to_string(),
                actual: input.amount.to_string(),
            });
        }

        if let Some(dest) = input.dest {
            txn.set_metadata("dest", dest);
        }
        txn.set_metadata("completed_at", Utc::now().to_rfc3339());
        txn.complete_settlement()?;

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
    fn pending_and_processing_are_the_only_completable_states() {
        assert!(matches!(SettlementStatus::Pending, SettlementStatus::Pending | SettlementStatus::Processing));
        assert!(matches!(SettlementStatus::Processing, SettlementStatus::Pending | SettlementStatus::Processing));
        assert!(!matches!(SettlementStatus::Completed, SettlementStatus::Pending | SettlementStatus::Processing));
    }
}
