//! The Transaction aggregate: immutable identity, mutable settlement state,
//! child settlement data, and a drainable domain-event outbox.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EngineError, Result};
use crate::events::{DomainEvent, EventPayload};
use crate::money::Money;

/// Where a ledger entry's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    Wallet,
    PaymentProvider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Purchase,
    WalletFunding,
    Sale,
    Commission,
    Withdrawal,
}

impl TransactionType {
    /// Direction used when `transaction_direction` is not explicitly
    /// overridden. 1.
    pub fn default_direction(self) -> TransactionDirection {
        match self {
            TransactionType::Purchase => TransactionDirection::Debit,
            TransactionType::WalletFunding => TransactionDirection::Credit,
            TransactionType::Sale => TransactionDirection::Credit,
            TransactionType::Commission => TransactionDirection::Credit,
            TransactionType::Withdrawal => TransactionDirection::Debit,
        }
    }

    pub fn funds_wallet_on_completion(self) -> bool {
        matches!(
            self,
            TransactionType::Sale | TransactionType::Commission | TransactionType::WalletFunding
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionDirection {
    Credit,
    Debit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Scheduled,
    Processing,
    Completed,
    Failed,
    NotApplicable,
}

impl SettlementStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SettlementStatus::Completed | SettlementStatus::Failed | SettlementStatus::NotApplicable)
    }

    fn name(self) -> &'static str {
        match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Scheduled => "scheduled",
            SettlementStatus::Processing => "processing",
            SettlementStatus::Completed => "completed",
            SettlementStatus::Failed => "failed",
            SettlementStatus::NotApplicable => "not_applicable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementRole {
    Organizer,
    Referrer,
    SystemAdmin,
}

/// Fee breakdown attached to a transaction when it was created from a
/// signed charge token. Mirrors the payload bound by the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeData {
    pub charge_setting_id: String,
    pub version_id: String,
    pub version_number: i32,
    pub charge_amount: Money,
    pub sponsored: bool,
}

/// A single planned recipient split appended to a parent transaction before
/// settlement children are materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementData {
    pub amount: Money,
    pub recipient_user: String,
    pub transaction_type: TransactionType,
    pub role: SettlementRole,
}

/// Opaque string-keyed metadata bag (slug, mode, dest, recipient id,
/// completion timestamp, ...).
pub type Metadata = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub reference: String,
    pub amount: Money,
    pub user_id: String,
    pub resource: String,
    pub resource_id: Option<String>,
    pub source: TransactionSource,
    pub transaction_type: TransactionType,
    pub transaction_direction: TransactionDirection,
    pub settlement_status: SettlementStatus,
    pub charge_data: Option<ChargeData>,
    pub settlement_data: Vec<SettlementData>,
    pub metadata: Metadata,
    pub parent_id: Option<String>,
    pub occurred_on: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub delayed_settlement_until: Option<DateTime<Utc>>,

    /// Transient outbox: populated on mutation, drained by `take_events`.
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

pub struct NewTransaction {
    pub id: String,
    pub reference: String,
    pub amount: Money,
    pub user_id: String,
    pub resource: String,
    pub resource_id: Option<String>,
    pub source: TransactionSource,
    pub transaction_type: TransactionType,
    pub transaction_direction: Option<TransactionDirection>,
    pub charge_data: Option<ChargeData>,
    pub metadata: Metadata,
    pub parent_id: Option<String>,
    pub occurred_on: DateTime<Utc>,
}

impl Transaction {
    pub fn new(new: NewTransaction) -> Result<Self> {
        new.amount.require_positive("amount")?;
        let direction = new
            .transaction_direction
            .unwrap_or_else(|| new.transaction_type.default_direction());
        let now = new.occurred_on;
        let mut txn = Transaction {
            id: new.id,
            reference: new.reference,
            amount: new.amount,
            user_id: new.user_id,
            resource: new.resource,
            resource_id: new.resource_id,
            source: new.source,
            transaction_type: new.transaction_type,
            transaction_direction: direction,
            settlement_status: SettlementStatus::Pending,
            charge_data: new.charge_data,
            settlement_data: Vec::new(),
            metadata: new.metadata,
            parent_id: new.parent_id,
            occurred_on: now,
            created_at: now,
            delayed_settlement_until: None,
            events: Vec::new(),
        };
        txn.emit(EventPayload::TransactionCreated {
            reference: txn.reference.clone(),
            transaction_type: txn.transaction_type,
            amount: txn.amount,
            user_id: txn.user_id.clone(),
            parent_id: txn.parent_id.clone(),
        });
        Ok(txn)
    }

    /// Rehydrate a `Transaction` already persisted by a repository. The
    /// outbox starts empty - a reloaded transaction has nothing pending to
    /// publish.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: String,
        reference: String,
        amount: Money,
        user_id: String,
        resource: String,
        resource_id: Option<String>,
        source: TransactionSource,
        transaction_type: TransactionType,
        transaction_direction: TransactionDirection,
        settlement_status: SettlementStatus,
        charge_data: Option<ChargeData>,
        settlement_data: Vec<SettlementData>,
        metadata: Metadata,
        parent_id: Option<String>,
        occurred_on: DateTime<Utc>,
        created_at: DateTime<Utc>,
        delayed_settlement_until: Option<DateTime<Utc>>,
    ) -> Self {
        Transaction {
            id,
            reference,
            amount,
            user_id,
            resource,
            resource_id,
            source,
            transaction_type,
            transaction_direction,
            settlement_status,
            charge_data,
            settlement_data,
            metadata,
            parent_id,
            occurred_on,
            created_at,
            delayed_settlement_until,
            events: Vec::new(),
        }
    }

    /// Drain the transient outbox. Must be called exactly once per
    /// persistence cycle, after the DB write that makes this mutation
    /// durable.
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, payload: EventPayload) {
        self.events.push(DomainEvent::new(self.reference.clone(), payload));
    }

    fn guard_transition(&self, to: SettlementStatus, allowed_from: &[SettlementStatus]) -> Result<()> {
        if allowed_from.contains(&self.settlement_status) {
            Ok(())
        } else {
            Err(EngineError::IllegalState {
                reference: self.reference.clone(),
                from: self.settlement_status.name().to_string(),
                to: to.name().to_string(),
            })
        }
    }

    /// `pending -> scheduled`, setting `delayed_settlement_until` strictly
    /// in the future.
    pub fn schedule(&mut self, run_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
        self.guard_transition(SettlementStatus::Scheduled, &[SettlementStatus::Pending])?;
        if run_at <= now {
            return Err(EngineError::invalid_input(
                "delayed_settlement_until",
                "must lie strictly in the future",
            ));
        }
        self.settlement_status = SettlementStatus::Scheduled;
        self.delayed_settlement_until = Some(run_at);
        Ok(())
    }

    /// `pending -> processing`, used by withdrawal dispatch.
    pub fn mark_processing(&mut self) -> Result<()> {
        self.guard_transition(SettlementStatus::Processing, &[SettlementStatus::Pending])?;
        self.settlement_status = SettlementStatus::Processing;
        Ok(())
    }

    /// Append a planned recipient split. Only legal while `pending`.
    pub fn add_settlement(&mut self, data: SettlementData) -> Result<()> {
        if self.settlement_status != SettlementStatus::Pending {
            return Err(EngineError::SettlementDataAfterPending {
                reference: self.reference.clone(),
            });
        }
        self.settlement_data.push(data);
        Ok(())
    }

    /// Materialize one child `Transaction` per queued `SettlementData`.
    /// Each child gets a fresh reference and emits its own
    /// `TransactionCreated`; callers are responsible for persisting and
    /// draining each child's outbox.
    pub fn create_settlement_transactions(
        &self,
        mut next_reference: impl FnMut() -> String,
        mut next_id: impl FnMut() -> String,
        now: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let sum: Money = self.settlement_data.iter().map(|d| d.amount).sum();
        if sum != self.amount {
            return Err(EngineError::SettlementSumMismatch {
                reference: self.reference.clone(),
                sum: sum.to_string(),
                amount: self.amount.to_string(),
            });
        }
        self.settlement_data
            .iter()
            .map(|data| {
                Transaction::new(NewTransaction {
                    id: next_id(),
                    reference: next_reference(),
                    amount: data.amount,
                    user_id: data.recipient_user.clone(),
                    resource: self.resource.clone(),
                    resource_id: self.resource_id.clone(),
                    source: TransactionSource::Wallet,
                    transaction_type: data.transaction_type,
                    transaction_direction: None,
                    charge_data: None,
                    metadata: Metadata::new(),
                    parent_id: Some(self.id.clone()),
                    occurred_on: now,
                })
            })
            .collect()
    }

    /// `pending|scheduled -> completed`. Emits `PurchaseSettled` for
    /// purchases, `Notify.withdrawal_complete` for withdrawals, nothing
    /// extra otherwise (callers of `FundAccountFromTxn` publish
    /// `WalletFunded` themselves once the wallet credit lands).
    pub fn complete_settlement(&mut self) -> Result<()> {
        self.guard_transition(
            SettlementStatus::Completed,
            &[SettlementStatus::Pending, SettlementStatus::Scheduled, SettlementStatus::Processing],
        )?;
        self.settlement_status = SettlementStatus::Completed;
        self.delayed_settlement_until = None;
        match self.transaction_type {
            TransactionType::Purchase => {
                self.emit(EventPayload::PurchaseSettled {
                    reference: self.reference.clone(),
                    amount: self.amount,
                });
            }
            TransactionType::Withdrawal => {
                self.emit(EventPayload::NotificationRequested {
                    channel: "user".into(),
                    template: "withdrawal_complete".into(),
                    user_id: self.user_id.clone(),
                    data: [("reference".to_string(), self.reference.clone())].into(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    /// `pending|processing -> failed`. Only permitted for manual-mode
    /// withdrawals. Returns the refundable amount (`amount + charge_amount`)
    /// for the caller to credit back to the wallet.
    pub fn mark_as_failed(&mut self, reason: impl Into<String>) -> Result<Money> {
        if self.transaction_type != TransactionType::Withdrawal
            || self.metadata.get("mode").map(String::as_str) != Some("manual")
        {
            return Err(EngineError::UnsupportedAdminTransition {
                attempted: "mark_as_failed".into(),
            });
        }
        self.guard_transition(
            SettlementStatus::Failed,
            &[SettlementStatus::Pending, SettlementStatus::Processing],
        )?;
        let charge = self
            .charge_data
            .as_ref()
            .map(|c| c.charge_amount)
            .unwrap_or(Money::ZERO);
        let refundable = self.amount.checked_add(charge);
        self.settlement_status = SettlementStatus::Failed;
        self.metadata.insert("failure_reason".into(), reason.into());
        self.emit(EventPayload::NotificationRequested {
            channel: "user".into(),
            template: "withdrawal_failed".into(),
            user_id: self.user_id.clone(),
            data: [("reference".to_string(), self.reference.clone())].into(),
        });
        Ok(refundable)
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn emit_transaction_created(&mut self) {
        self.emit(EventPayload::TransactionCreated {
            reference: self.reference.clone(),
            transaction_type: self.transaction_type,
            amount: self.amount,
            user_id: self.user_id.clone(),
            parent_id: self.parent_id.clone(),
        });
    }

    pub fn emit_wallet_funded(&mut self) {
        self.emit(EventPayload::WalletFunded {
            user_id: self.user_id.clone(),
            amount: self.amount,
            reference: self.reference.clone(),
        });
    }

    pub fn emit_notification(&mut self, channel: &str, template: &str, data: Metadata) {
        self.emit(EventPayload::NotificationRequested {
            channel: channel.to_string(),
            template: template.to_string(),
            user_id: self.user_id.clone(),
            data,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(amount: Money) -> Transaction {
        Transaction::new(NewTransaction {
            id: "id-1".into(),
            reference: "ref-1".into(),
            amount,
            user_id: "user-1".into(),
            resource: "ticket".into(),
            resource_id: Some("tt-1".into()),
            source: TransactionSource::PaymentProvider,
            transaction_type: TransactionType::Purchase,
            transaction_direction: None,
            charge_data: None,
            metadata: Metadata::new(),
            parent_id: None,
            occurred_on: Utc::now(),
        })
        .unwrap()
    }

    #[test]
    fn new_rejects_zero_amount() {
        let err = Transaction::new(NewTransaction {
            id: "id-1".into(),
            reference: "ref-1".into(),
            amount: Money::ZERO,
            user_id: "user-1".into(),
            resource: "ticket".into(),
            resource_id: None,
            source: TransactionSource::PaymentProvider,
            transaction_type: TransactionType::Purchase,
            transaction_direction: None,
            charge_data: None,
            metadata: Metadata::new(),
            parent_id: None,
            occurred_on: Utc::now(),
        });
        assert!(err.is_err());
    }

    #[test]
    fn default_direction_matches_table() {
        assert_eq!(
            TransactionType::Purchase.default_direction(),
            TransactionDirection::Debit
        );
        assert_eq!(
            TransactionType::WalletFunding.default_direction(),
            TransactionDirection::Credit
        );
        assert_eq!(
            TransactionType::Withdrawal.default_direction(),
            TransactionDirection::Debit
        );
    }

    #[test]
    fn complete_settlement_fails_unless_pending_family() {
        let mut txn = sample(Money::new(rust_decimal_macros::dec!(100)));
        txn.complete_settlement().unwrap();
        assert!(txn.complete_settlement().is_err());
    }

    #[test]
    fn add_settlement_fails_after_pending() {
        let mut txn = sample(Money::new(rust_decimal_macros::dec!(100)));
        txn.complete_settlement().unwrap();
        let data = SettlementData {
            amount: Money::new(rust_decimal_macros::dec!(100)),
            recipient_user: "organizer".into(),
            transaction_type: TransactionType::Sale,
            role: SettlementRole::Organizer,
        };
        assert!(txn.add_settlement(data).is_err());
    }

    #[test]
    fn create_settlement_transactions_requires_exact_sum() {
        let mut txn = sample(Money::new(rust_decimal_macros::dec!(100)));
        txn.add_settlement(SettlementData {
            amount: Money::new(rust_decimal_macros::dec!(50)),
            recipient_user: "organizer".into(),
            transaction_type: TransactionType::Sale,
            role: SettlementRole::Organizer,
        })
        .unwrap();
        let counter = std::cell::Cell::new(0u32);
        let result = txn.create_settlement_transactions(
            || {
                counter.set(counter.get() + 1);
                format!("child-ref-{}", counter.get())
            },
            || {
                counter.set(counter.get() + 1);
                format!("child-id-{}", counter.get())
            },
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn schedule_requires_future_timestamp() {
        let mut txn = sample(Money::new(rust_decimal_macros::dec!(100)));
        let now = Utc::now();
        assert!(txn.schedule(now - Duration::hours(1), now).is_err());
        assert!(txn.schedule(now + Duration::hours(1), now).is_ok());
        assert_eq!(txn.settlement_status, SettlementStatus::Scheduled);
    }

    #[test]
    fn mark_as_failed_requires_manual_withdrawal() {
        let mut txn = sample(Money::new(rust_decimal_macros::dec!(100)));
        assert!(txn.mark_as_failed("test").is_err());
    }

    #[test]
    fn take_events_drains_outbox() {
        let mut txn = sample(Money::new(rust_decimal_macros::dec!(100)));
        let events = txn.take_events();
        assert_eq!(events.len(), 1);
        assert!(txn.take_events().is_empty());
    }
}
