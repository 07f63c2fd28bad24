//! Domain event envelope and typed payloads.
//!
//! Payloads are plain data (ids, `Money`, strings) rather than references to
//! `Transaction`/`Wallet` themselves, breaking the cyclic-looking
//! event/entity relationship the source exhibits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::transaction::TransactionType;
use crate::money::Money;

/// `"<group>.<name>"`, e.g. `"transaction.created"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType(pub String);

impl EventType {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "payload")]
pub enum EventPayload {
    #[serde(rename = "transaction.created")]
    TransactionCreated {
        reference: String,
        transaction_type: TransactionType,
        amount: Money,
        user_id: String,
        parent_id: Option<String>,
    },
    #[serde(rename = "transaction.purchased")]
    PurchaseSettled { reference: String, amount: Money },
    #[serde(rename = "transaction.withdraw_successful")]
    WithdrawalCompleted {
        reference: String,
        amount: Money,
        user_id: String,
        /// Destination account string the provider's webhook reported, if any.
        dest: Option<String>,
    },
    #[serde(rename = "wallet.funded")]
    WalletFunded {
        user_id: String,
        amount: Money,
        reference: String,
    },
    #[serde(rename = "notification.requested")]
    NotificationRequested {
        channel: String,
        template: String,
        user_id: String,
        data: BTreeMap<String, String>,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> &'static str {
        match self {
            EventPayload::TransactionCreated { .. } => "transaction.created",
            EventPayload::PurchaseSettled { .. } => "transaction.purchased",
            EventPayload::WithdrawalCompleted { .. } => "transaction.withdraw_successful",
            EventPayload::WalletFunded { .. } => "wallet.funded",
            EventPayload::NotificationRequested { .. } => "notification.requested",
        }
    }
}

/// Immutable-once-emitted envelope. `aggregate_id` is the partitioning key
/// for the event bus: the transaction `reference` for
/// transaction-rooted events, so all messages for one aggregate land on one
/// partition and are processed in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_id: String,
    pub aggregate_id: String,
    pub occurred_on: DateTime<Utc>,
    pub version: u32,
    pub payload: EventPayload,
}

impl DomainEvent {
    pub fn new(aggregate_id: String, payload: EventPayload) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            aggregate_id,
            occurred_on: Utc::now(),
            version: 1,
            payload,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_matches_topic_table() {
        let payload = EventPayload::WalletFunded {
            user_id: "u1".into(),
            amount: Money::ZERO,
            reference: "r1".into(),
        };
        assert_eq!(payload.event_type(), "wallet.funded");
    }

    #[test]
    fn serialization_round_trips() {
        let event = DomainEvent::new(
            "r1".into(),
            EventPayload::TransactionCreated {
                reference: "r1".into(),
                transaction_type: TransactionType::Purchase,
                amount: Money::ZERO,
                user_id: "u1".into(),
                parent_id: None,
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: DomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.aggregate_id, event.aggregate_id);
        assert_eq!(back.event_type(), "transaction.created");
    }
}
