//! `SubmitWithdrawal`: debits the wallet against a
//! signed withdrawal-charge token and records a `pending` withdrawal
//! transaction. The handler that dispatches it to the external bank
//! transfer lives in [`crate::withdrawal_dispatch`].

use chrono::Utc;
use std::sync::Arc;

use ticketledger_bus::EventBus;
use ticketledger_core::id::{new_id, new_reference};
use ticketledger_crypto::HmacSigner;
use ticketledger_db::{TransactionRepository, WalletRepository};
use ticketledger_types::{
    ChargeData, EngineError, Metadata, Money, NewTransaction, Result, Transaction,
    TransactionSource, TransactionType,
};

use crate::support::wrap_db;

pub struct SubmitWithdrawalInput {
    pub charge_setting_id: String,
    pub version_id: String,
    pub version_number: i32,
    pub calculated_charge: Money,
    pub amount: Money,
    pub signature: String,
}

pub struct SubmitWithdrawal {
    transactions: Arc<TransactionRepository>,
    wallets: Arc<WalletRepository>,
    charge_signer: HmacSigner,
    bus: EventBus,
}

impl SubmitWithdrawal {
    pub fn new(
        transactions: Arc<TransactionRepository>,
        wallets: Arc<WalletRepository>,
        charge_signer: HmacSigner,
        bus: EventBus,
    ) -> Self {
        Self { transactions, wallets, charge_signer, bus }
    }

    pub async fn execute(&self, input: SubmitWithdrawalInput, user_id: &str) -> Result<Transaction> {
        let payload = serde_json::json!({
            "base_amount": input.amount,
            "charge_setting_id": input.charge_setting_id,
            "version_id": input.version_id,
            "version_number": input.version_number,
            "calculated_charge": input.calculated_charge,
            "user": user_id,
            "signature": input.signature,
        });
        self.charge_signer.verify_object(&payload)?;

        let total = input.amount.checked_add(input.calculated_charge);

        let mut db_tx = self.transactions.begin().await.map_err(wrap_db)?;
        let mut wallet = self.wallets.lock_or_create(&mut db_tx, user_id, new_id).await.map_err(wrap_db)?;

        // Balance only - pending funds already committed to another
        // withdrawal do not count toward this one.
        if !wallet.can_withdraw(total) {
            return Err(EngineError::InsufficientBalance {
                user_id: user_id.to_string(),
                requested: total.to_string(),
                available: wallet.balance.to_string(),
            });
        }

        let mut txn = Transaction::new(NewTransaction {
            id: new_id(),
            reference: new_reference("wd"),
            amount: input.amount,
            user_id: user_id.to_string(),
            resource: "withdrawal".into(),
            resource_id: None,
            source: TransactionSource::Wallet,
            transaction_type: TransactionType::Withdrawal,
            transaction_direction: None,
            charge_data: Some(ChargeData {
                charge_setting_id: input.charge_setting_id,
                version_id: input.version_id,
                version_number: input.version_number,
                charge_amount: input.calculated_charge,
                sponsored: false,
            }),
            metadata: Metadata::new(),
            parent_id: None,
            occurred_on: Utc::now(),
        })?;

        wallet.withdraw(total)?;

        self.transactions.insert(&mut db_tx, &txn).await.map_err(wrap_db)?;
        self.wallets.update(&mut db_tx, &wallet).await.map_err(wrap_db)?;
        db_tx.commit().await.map_err(|e| wrap_db(e.into()))?;

        for event in txn.take_events() {
            let _ = self.bus.publish(event);
        }
        Ok(txn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn signed_payload_round_trips_through_the_charge_signer() {
        let signer = HmacSigner::new(b"charge-req-key".to_vec());
        let input = SubmitWithdrawalInput {
            charge_setting_id: "cs1".into(),
            version_id: "v1".into(),
            version_number: 1,
            calculated_charge: Money::new(dec!(50)),
            amount: Money::new(dec!(1000)),
            signature: String::new(),
        };
        let mut payload = serde_json::json!({
            "base_amount": input.amount,
            "charge_setting_id": input.charge_setting_id,
            "version_id": input.version_id,
            "version_number": input.version_number,
            "calculated_charge": input.calculated_charge,
            "user": "user-1",
        });
        let signature = signer.sign_value(&payload);
        payload["signature"] = serde_json::Value::String(signature);
        assert!(signer.verify_object(&payload).is_ok());
    }
}
