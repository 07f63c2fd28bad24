//! In-process event bus for the settlement engine.
//!
//! Implements the at-least-once, partitioned pub/sub contract the
//! Kafka-backed original uses, over an in-memory transport: no crate in
//! the example corpus wraps a real Kafka wire client, so `publish` sends
//! directly onto a per-partition `tokio::mpsc` queue instead of a network
//! broker. `KAFKA_*` configuration is still fully parsed (see
//! [`config::BusConfig`]) so operators can point it at a real cluster once
//! one exists to point at.
//!
//! # Delivery
//!
//! `aggregate_id` selects the partition, so every event for one
//! transaction reference is processed in order by a single consumer task.
//! A consumer task pulls a message, runs every handler registered for its
//! `event_type`, and commits the offset only once all of them return
//! `Ok`. A handler failure is logged and the offset is left where it was -
//! at-least-once delivery, paid for with duplicate processing on replay,
//! matching the source's stated trade-off.

pub mod config;
pub mod error;
pub mod offset;
pub mod partition;
pub mod registry;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use ticketledger_types::DomainEvent;

pub use config::BusConfig;
pub use error::{BusError, BusResult};
pub use offset::OffsetTable;
pub use registry::{EventHandler, HandlerRegistry};

/// A queued event plus its partition offset. Opaque to callers - received
/// only to be handed straight back into [`EventBus::spawn_consumers`].
pub struct Message {
    offset: u64,
    event: DomainEvent,
}

struct Partition {
    sender: mpsc::UnboundedSender<Message>,
    next_offset: AtomicU64,
}

/// Partitioned, at-least-once event bus.
///
/// Clone is cheap - it shares the underlying queues, registry, and offset
/// table via `Arc`.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

struct Inner {
    group_id: String,
    partitions: Vec<Partition>,
    registry: HandlerRegistry,
    offsets: OffsetTable,
}

impl EventBus {
    pub fn new(config: &BusConfig) -> (Self, Vec<mpsc::UnboundedReceiver<Message>>) {
        let mut senders = Vec::with_capacity(config.partitions);
        let mut receivers = Vec::with_capacity(config.partitions);
        for _ in 0..config.partitions {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.push(Partition { sender: tx, next_offset: AtomicU64::new(0) });
            receivers.push(rx);
        }

        let bus = Self {
            inner: Arc::new(Inner {
                group_id: config.group_id.clone(),
                partitions: senders,
                registry: HandlerRegistry::new(),
                offsets: OffsetTable::new(),
            }),
        };
        (bus, receivers)
    }

    pub fn partition_count(&self) -> usize {
        self.inner.partitions.len()
    }

    /// Register `handler` to run whenever an event of `event_type` (e.g.
    /// `"transaction.created"`) is delivered.
    pub fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.inner.registry.register(event_type, handler);
    }

    /// Fire-and-ack: the event is handed to its partition's queue and this
    /// returns immediately. Delivery to handlers happens on the consumer
    /// task started by [`EventBus::spawn_consumers`].
    pub fn publish(&self, event: DomainEvent) -> BusResult<()> {
        let idx = partition::partition_of(&event.aggregate_id, self.inner.partitions.len());
        let partition = &self.inner.partitions[idx];
        let offset = partition.next_offset.fetch_add(1, Ordering::SeqCst);
        info!(event_type = event.event_type(), aggregate_id = %event.aggregate_id, partition = idx, offset, "publishing event");
        partition
            .sender
            .send(Message { offset, event })
            .map_err(|e| BusError::Publish(e.to_string()))
    }

    pub fn committed_offset(&self, partition: usize) -> u64 {
        self.inner.offsets.committed_offset(&self.inner.group_id, partition)
    }

    /// Drive every partition's consumer loop to completion. Each receiver
    /// handed back by [`EventBus::new`] must be consumed exactly once -
    /// pass them here after all handlers have been `subscribe`d.
    pub fn spawn_consumers(&self, receivers: Vec<mpsc::UnboundedReceiver<Message>>) -> Vec<JoinHandle<()>> {
        receivers
            .into_iter()
            .enumerate()
            .map(|(idx, rx)| {
                let bus = self.clone();
                tokio::spawn(async move { bus.run_partition(idx, rx).await })
            })
            .collect()
    }

    async fn run_partition(&self, partition: usize, mut rx: mpsc::UnboundedReceiver<Message>) {
        while let Some(message) = rx.recv().await {
            let event_type = message.event.event_type();
            let handlers = self.inner.registry.handlers_for(event_type);
            if handlers.is_empty() {
                warn!(event_type, partition, "no handlers registered, skipping commit");
                continue;
            }

            let mut all_ok = true;
            for handler in &handlers {
                if let Err(err) = handler.handle(&message.event).await {
                    error!(event_type, handler = handler.name(), error = %err, "event handler failed, offset will not commit");
                    all_ok = false;
                }
            }

            if all_ok {
                self.inner.offsets.commit(&self.inner.group_id, partition, message.offset + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use ticketledger_types::{EventPayload, Money};

    struct RecordingHandler {
        seen: Arc<Mutex<Vec<String>>>,
        fail_first: bool,
        calls: AtomicU64,
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn handle(&self, event: &DomainEvent) -> Result<(), BusError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && call == 0 {
                return Err(BusError::Handler("boom".into()));
            }
            self.seen.lock().push(event.aggregate_id.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "recording-handler"
        }
    }

    fn funded_event(aggregate_id: &str) -> DomainEvent {
        DomainEvent::new(
            aggregate_id.to_string(),
            EventPayload::WalletFunded {
                user_id: "u1".into(),
                amount: Money::ZERO,
                reference: aggregate_id.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn delivers_in_order_per_aggregate_and_commits() {
        let config = BusConfig { partitions: 1, ..BusConfig::default() };
        let (bus, receivers) = EventBus::new(&config);
        let seen = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(
            "wallet.funded",
            Arc::new(RecordingHandler { seen: seen.clone(), fail_first: false, calls: AtomicU64::new(0) }),
        );
        let handles = bus.spawn_consumers(receivers);

        bus.publish(funded_event("txn_1")).unwrap();
        bus.publish(funded_event("txn_1")).unwrap();
        bus.publish(funded_event("txn_1")).unwrap();

        // Drop the publish side so the consumer loop can drain and exit.
        drop(bus.clone());
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert_eq!(seen.lock().len(), 3);
        assert_eq!(bus.committed_offset(0), 3);
        for handle in handles {
            handle.abort();
        }
    }

    #[tokio::test]
    async fn failed_handler_blocks_commit_but_does_not_stop_the_loop() {
        let config = BusConfig { partitions: 1, ..BusConfig::default() };
        let (bus, receivers) = EventBus::new(&config);
        let seen = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(
            "wallet.funded",
            Arc::new(RecordingHandler { seen: seen.clone(), fail_first: true, calls: AtomicU64::new(0) }),
        );
        let handles = bus.spawn_consumers(receivers);

        bus.publish(funded_event("txn_1")).unwrap();
        bus.publish(funded_event("txn_2")).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        // The first message's handler failed, so the offset never advanced
        // past it even though the second message was handled fine.
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(bus.committed_offset(0), 0);
        for handle in handles {
            handle.abort();
        }
    }

    #[tokio::test]
    async fn different_aggregates_land_on_different_partitions() {
        let config = BusConfig { partitions: 8, ..BusConfig::default() };
        let (bus, _receivers) = EventBus::new(&config);
        bus.publish(funded_event("txn_a")).unwrap();
        bus.publish(funded_event("txn_b")).unwrap();
        // No assertion on which partitions - just that publish accepts a
        // spread of keys without panicking.
        assert_eq!(bus.partition_count(), 8);
    }
}
