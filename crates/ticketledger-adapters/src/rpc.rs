//! Ticket/user service RPC stubs
//! `GRPC_TICKET_SVC_TARGET` / `GRPC_USER_SVC_TARGET` targets.
//!
//! Grounded on `app/domain/ports/ticket_service.py` and
//! `app/domain/ports/user_service.py`: the method set here is a direct
//! port of `ITicketService`/`IUserService`. No crate in the example
//! corpus wraps a real gRPC client (`tonic` never appears in a teacher or
//! pack `Cargo.toml`), so these are JSON-over-HTTP stubs reqwest can
//! speak against the same `GRPC_*_TARGET` host - a deliberate scope
//! decision recorded in DESIGN.md, the same shape as the event bus's
//! in-memory stand-in for Kafka.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use ticketledger_types::{EngineError, Money};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::RpcConfig;

#[async_trait]
pub trait TicketService: Send + Sync {
    async fn get_ticket_price(&self, ticket_type_id: &str) -> Result<Money, EngineError>;
    async fn reservation_is_valid(&self, reservation_id: &str) -> Result<(bool, Option<String>), EngineError>;
    async fn mark_reservation_as_paid(&self, reservation_id: &str, amount: Money) -> Result<(), EngineError>;
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_event_organizer(&self, slug: &str) -> Result<String, EngineError>;
    async fn get_system_user_id(&self) -> Result<String, EngineError>;
    async fn get_referral_info(&self, user_id: &str) -> Result<Option<String>, EngineError>;
}

pub struct HttpTicketService {
    client: reqwest::Client,
    target: String,
    breaker: CircuitBreaker,
    deadline: Duration,
}

impl HttpTicketService {
    pub fn new(config: &RpcConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            target: config.ticket_svc_target.clone(),
            breaker: CircuitBreaker::for_rpc("ticket-service"),
            deadline: config.call_deadline,
        }
    }
}

#[derive(Deserialize)]
struct PriceResponse {
    price: Money,
}

#[derive(Deserialize)]
struct ReservationValidResponse {
    valid: bool,
    reason: Option<String>,
}

#[async_trait]
impl TicketService for HttpTicketService {
    async fn get_ticket_price(&self, ticket_type_id: &str) -> Result<Money, EngineError> {
        let client = &self.client;
        let url = format!("{}/ticket-types/{}/price", self.target, ticket_type_id);
        self.breaker
            .call(self.deadline, || async {
                let resp = client.get(&url).send().await.map_err(|e| {
                    EngineError::UpstreamUnavailable { service: "ticket-service".into(), reason: e.to_string() }
                })?;
                resp.json::<PriceResponse>()
                    .await
                    .map(|r| r.price)
                    .map_err(|e| EngineError::UpstreamUnavailable { service: "ticket-service".into(), reason: e.to_string() })
            })
            .await
    }

    async fn reservation_is_valid(&self, reservation_id: &str) -> Result<(bool, Option<String>), EngineError> {
        let client = &self.client;
        let url = format!("{}/reservations/{}/valid", self.target, reservation_id);
        self.breaker
            .call(self.deadline, || async {
                let resp = client.get(&url).send().await.map_err(|e| {
                    EngineError::UpstreamUnavailable { service: "ticket-service".into(), reason: e.to_string() }
                })?;
                resp.json::<ReservationValidResponse>()
                    .await
                    .map(|r| (r.valid, r.reason))
                    .map_err(|e| EngineError::UpstreamUnavailable { service: "ticket-service".into(), reason: e.to_string() })
            })
            .await
    }

    async fn mark_reservation_as_paid(&self, reservation_id: &str, amount: Money) -> Result<(), EngineError> {
        let client = &self.client;
        let url = format!("{}/reservations/{}/mark-paid", self.target, reservation_id);
        let payload = serde_json::json!({ "amount": amount });
        self.breaker
            .call(self.deadline, || async {
                let resp = client.post(&url).json(&payload).send().await.map_err(|e| {
                    EngineError::UpstreamUnavailable { service: "ticket-service".into(), reason: e.to_string() }
                })?;
                if resp.status().is_success() {
                    Ok(())
                } else {
                    Err(EngineError::UpstreamUnavailable {
                        service: "ticket-service".into(),
                        reason: format!("HTTP {}", resp.status()),
                    })
                }
            })
            .await
    }
}

pub struct HttpUserService {
    client: reqwest::Client,
    target: String,
    breaker: CircuitBreaker,
    deadline: Duration,
}

impl HttpUserService {
    pub fn new(config: &RpcConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            target: config.user_svc_target.clone(),
            breaker: CircuitBreaker::for_rpc("user-service"),
            deadline: config.call_deadline,
        }
    }
}

#[derive(Deserialize)]
struct OrganizerResponse {
    organizer_id: String,
}

#[derive(Deserialize)]
struct SystemUserResponse {
    system_user_id: String,
}

#[derive(Deserialize)]
struct ReferralResponse {
    referrer_id: Option<String>,
}

#[async_trait]
impl UserService for HttpUserService {
    async fn get_event_organizer(&self, slug: &str) -> Result<String, EngineError> {
        let client = &self.client;
        let url = format!("{}/events/{}/organizer", self.target, slug);
        self.breaker
            .call(self.deadline, || async {
                let resp = client.get(&url).send().await.map_err(|e| {
                    EngineError::UpstreamUnavailable { service: "user-service".into(), reason: e.to_string() }
                })?;
                resp.json::<OrganizerResponse>()
                    .await
                    .map(|r| r.organizer_id)
                    .map_err(|e| EngineError::UpstreamUnavailable { service: "user-service".into(), reason: e.to_string() })
            })
            .await
    }

    async fn get_system_user_id(&self) -> Result<String, EngineError> {
        let client = &self.client;
        let url = format!("{}/system-user", self.target);
        self.breaker
            .call(self.deadline, || async {
                let resp = client.get(&url).send().await.map_err(|e| {
                    EngineError::UpstreamUnavailable { service: "user-service".into(), reason: e.to_string() }
                })?;
                resp.json::<SystemUserResponse>()
                    .await
                    .map(|r| r.system_user_id)
                    .map_err(|e| EngineError::UpstreamUnavailable { service: "user-service".into(), reason: e.to_string() })
            })
            .await
    }

    async fn get_referral_info(&self, user_id: &str) -> Result<Option<String>, EngineError> {
        let client = &self.client;
        let url = format!("{}/users/{}/referrer", self.target, user_id);
        self.breaker
            .call(self.deadline, || async {
                let resp = client.get(&url).send().await.map_err(|e| {
                    EngineError::UpstreamUnavailable { service: "user-service".into(), reason: e.to_string() }
                })?;
                resp.json::<ReferralResponse>()
                    .await
                    .map(|r| r.referrer_id)
                    .map_err(|e| EngineError::UpstreamUnavailable { service: "user-service".into(), reason: e.to_string() })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_config_carries_the_half_second_deadline() {
        let config = RpcConfig {
            ticket_svc_target: "http://localhost:1".into(),
            user_svc_target: "http://localhost:2".into(),
            call_deadline: Duration::from_millis(500),
        };
        assert_eq!(config.call_deadline, Duration::from_millis(500));
    }
}
