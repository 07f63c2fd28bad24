//! `FundAccountFromTxn`: credits a user's wallet for a
//! settlement child of type `sale`, `commission`, or `wallet_funding`, then
//! closes the child transaction out as `completed`.

use std::sync::Arc;

use ticketledger_bus::EventBus;
use ticketledger_core::id::new_id;
use ticketledger_db::{TransactionRepository, WalletRepository};
use ticketledger_types::{EngineError, Money, Result};

use crate::support::wrap_db;

pub struct FundAccountFromTxn {
    transactions: Arc<TransactionRepository>,
    wallets: Arc<WalletRepository>,
    bus: EventBus,
    max_wallet_balance: Option<Money>,
}

impl FundAccountFromTxn {
    pub fn new(
        transactions: Arc<TransactionRepository>,
        wallets: Arc<WalletRepository>,
        bus: EventBus,
        max_wallet_balance: Option<Money>,
    ) -> Self {
        Self { transactions, wallets, bus, max_wallet_balance }
    }

    pub async fn execute(&self, reference: &str) -> Result<()> {
        let mut db_tx = self.transactions.begin().await.map_err(wrap_db)?;
        let mut txn = self
            .transactions
            .lock_by_reference(&mut db_tx, reference)
            .await
            .map_err(wrap_db)?
            .ok_or_else(|| EngineError::TransactionNotFound { reference: reference.to_string() })?;

        if txn.settlement_status.is_terminal() {
            return Ok(());
        }
        if !txn.transaction_type.funds_wallet_on_completion() {
            return Ok(());
        }

        let mut wallet = self
            .wallets
            .lock_or_create(&mut db_tx, &txn.user_id, new_id)
            .await
            .map_err(wrap_db)?;
        wallet.deposit(txn.amount, self.max_wallet_balance)?;
        txn.complete_settlement()?;
        txn.emit_wallet_funded();

        self.wallets.update(&mut db_tx, &wallet).await.map_err(wrap_db)?;
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
    use ticketledger_types::TransactionType;

    #[test]
    fn only_credit_bearing_types_fund_a_wallet() {
        assert!(TransactionType::Sale.funds_wallet_on_completion());
        assert!(TransactionType::Commission.funds_wallet_on_completion());
        assert!(TransactionType::WalletFunding.funds_wallet_on_completion());
        assert!(!TransactionType::Purchase.funds_wallet_on_completion());
        assert!(!TransactionType::Withdrawal.funds_wallet_on_completion());
    }
}
