//! `SettleTicketPurchase`: closes out a `purchase`
//! transaction's reservation, computes the organizer/referrer/system split,
//! and materializes the settlement children. Invoked by the event handler on
//! `TransactionCreated`, and again by the scheduled-settlement worker once a
//! delayed transaction comes due - in the latter case the transaction is
//! already `scheduled`, so the delay branch is skipped and settlement runs
//! directly.

use chrono::{Duration, Utc};
use std::sync::Arc;

use ticketledger_adapters::{TicketService, UserService};
use ticketledger_bus::EventBus;
use ticketledger_core::id::{new_id, new_reference};
use ticketledger_core::{compute_purchase_splits, ReferrerInfo};
use ticketledger_db::TransactionRepository;
use ticketledger_types::{EngineError, Result, SettlementStatus};

use crate::config::EngineConfig;
use crate::support::wrap_db;

pub struct SettleTicketPurchase {
    transactions: Arc<TransactionRepository>,
    tickets: Arc<dyn TicketService>,
    users: Arc<dyn UserService>,
    bus: EventBus,
    config: EngineConfig,
}

impl SettleTicketPurchase {
    pub fn new(
        transactions: Arc<TransactionRepository>,
        tickets: Arc<dyn TicketService>,
        users: Arc<dyn UserService>,
        bus: EventBus,
        config: EngineConfig,
    ) -> Self {
        Self { transactions, tickets, users, bus, config }
    }

    pub async fn execute(&self, reference: &str) -> Result<()> {
        let mut db_tx = self.transactions.begin().await.map_err(wrap_db)?;
        let mut txn = self
            .transactions
            .lock_by_reference(&mut db_tx, reference)
            .await
            .map_err(wrap_db)?
            .ok_or_else(|| EngineError::TransactionNotFound { reference: reference.to_string() })?;

        // Idempotency: a redelivered `TransactionCreated` for an
        // already-settled txn is a no-op.
        if txn.settlement_status.is_terminal() {
            return Ok(());
        }

        if txn.settlement_status == SettlementStatus::Pending && self.config.settlement_delay_hours > 0 {
            let now = Utc::now();
            let run_at = now + Duration::hours(self.config.settlement_delay_hours);
            txn.schedule(run_at, now)?;
            self.transactions.update(&mut db_tx, &txn).await.map_err(wrap_db)?;
            db_tx.commit().await.map_err(|e| wrap_db(e.into()))?;
            for event in txn.take_events() {
                let _ = self.bus.publish(event);
            }
            return Ok(());
        }

        let charge_data = txn.charge_data.clone().ok_or_else(|| EngineError::MalformedProviderTransaction {
            reference: reference.to_string(),
            reason: "missing charge_data".into(),
        })?;
        if charge_data.sponsored {
            return Err(EngineError::SponsoredChargeNotImplemented);
        }

        self.tickets.mark_reservation_as_paid(reference, txn.amount).await?;

        let slug = txn.metadata.get("slug").cloned().ok_or_else(|| EngineError::MalformedProviderTransaction {
            reference: reference.to_string(),
            reason: "missing metadata.slug".into(),
        })?;
        let organizer = self.users.get_event_organizer(&slug).await?;

        let (system_user, organizer_referrer, buyer_referrer) = tokio::try_join!(
            self.users.get_system_user_id(),
            self.users.get_referral_info(&organizer),
            self.users.get_referral_info(&txn.user_id),
        )?;

        let referrers = ReferrerInfo { buyer_referrer, organizer_referrer };
        let fee = charge_data.charge_amount;
        let splits = compute_purchase_splits(txn.amount, fee, &organizer, &system_user, &referrers);
        for split in splits {
            txn.add_settlement(split)?;
        }

        let now = Utc::now();
        let children = txn.create_settlement_transactions(
            || new_reference("txn"),
            new_id,
            now,
        )?;
        txn.complete_settlement()?;

        self.transactions.update(&mut db_tx, &txn).await.map_err(wrap_db)?;
        let mut child_events = Vec::new();
        for mut child in children {
            self.transactions.insert(&mut db_tx, &child).await.map_err(wrap_db)?;
            child_events.extend(child.take_events());
        }
        db_tx.commit().await.map_err(|e| wrap_db(e.into()))?;

        for event in txn.take_events().into_iter().chain(child_events) {
            let _ = self.bus.publish(event);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_branch_only_applies_while_pending() {
        // `scheduled` transactions (the worker's due batch) must fall
        // through to the settlement branch rather than re-scheduling.
        assert!(SettlementStatus::Scheduled != SettlementStatus::Pending);
    }
}
