//! Event bus configuration.
//!
//! Every `KAFKA_*` variable the original deployment recognizes is parsed
//! here even though the transport underneath is an in-process partitioned
//! queue, not a wire-level Kafka client (see crate docs).

#[derive(Debug, Clone)]
pub struct BusConfig {
    pub bootstrap_servers: String,
    pub group_id: String,
    pub auto_offset_reset: String,
    pub enable_auto_commit: bool,
    pub partitions: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".to_string(),
            group_id: "ticketledger".to_string(),
            auto_offset_reset: "earliest".to_string(),
            enable_auto_commit: false,
            partitions: 8,
        }
    }
}

impl BusConfig {
    pub fn from_env() -> Self {
        Self {
            bootstrap_servers: std::env::var("KAFKA_BOOTSTRAP_SERVERS")
                .unwrap_or_else(|_| "localhost:9092".to_string()),
            group_id: std::env::var("KAFKA_GROUP_ID")
                .unwrap_or_else(|_| "ticketledger".to_string()),
            auto_offset_reset: std::env::var("KAFKA_AUTO_OFFSET_RESET")
                .unwrap_or_else(|_| "earliest".to_string()),
            enable_auto_commit: std::env::var("KAFKA_ENABLE_AUTO_COMMIT")
                .ok()
                .map(|s| s == "true" || s == "1")
                .unwrap_or(false),
            partitions: std::env::var("TICKETLEDGER__BUS__PARTITIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_disable_auto_commit() {
        let config = BusConfig::default();
        assert!(!config.enable_auto_commit);
        assert_eq!(config.auto_offset_reset, "earliest");
    }
}
