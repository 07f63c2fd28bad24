//! Handler registration, keyed by `event_type` (`"<group>.<name>"`, e.g.
//! `"transaction.created"`). `DomainEvent`'s tagged `EventPayload` enum acts
//! as the event registry: decoding the envelope already produces the
//! concrete typed event, so there is no separate deserialization table to
//! maintain here - this module only tracks who wants to be called.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use ticketledger_types::DomainEvent;

use crate::error::BusError;

#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent) -> Result<(), BusError>;

    /// Shown in logs when a handler fails.
    fn name(&self) -> &str {
        "unnamed-handler"
    }
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }

    pub fn handlers_for(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        self.handlers.read().get(event_type).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketledger_types::EventPayload;

    struct Noop;

    #[async_trait]
    impl EventHandler for Noop {
        async fn handle(&self, _event: &DomainEvent) -> Result<(), BusError> {
            Ok(())
        }
    }

    #[test]
    fn unregistered_event_type_has_no_handlers() {
        let registry = HandlerRegistry::new();
        assert!(registry.handlers_for("transaction.created").is_empty());
    }

    #[tokio::test]
    async fn registered_handler_is_returned() {
        let registry = HandlerRegistry::new();
        registry.register("transaction.created", Arc::new(Noop));
        let found = registry.handlers_for("transaction.created");
        assert_eq!(found.len(), 1);

        let event = DomainEvent::new(
            "txn_1".into(),
            EventPayload::WalletFunded {
                user_id: "u1".into(),
                amount: ticketledger_types::Money::ZERO,
                reference: "txn_1".into(),
            },
        );
        found[0].handle(&event).await.unwrap();
    }
}
