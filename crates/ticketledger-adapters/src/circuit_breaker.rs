//! Circuit breaker and per-call deadline for outbound RPCs.
//!
//! Ticket/user service calls run behind a breaker that opens after 10
//! consecutive failures and stays open for 60s, plus a 0.5s deadline on
//! critical authority calls: `parking_lot::Mutex` for shared mutable
//! state, `tokio::time::timeout` for the deadline, and the existing
//! `EngineError::{CircuitOpen, UpstreamTimeout, UpstreamUnavailable}`
//! variants for the outcomes.

use std::future::Future;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use ticketledger_types::EngineError;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
enum State {
    Closed { consecutive_failures: u32 },
    Open { opened_at: Instant },
}

pub struct CircuitBreaker {
    service: String,
    failure_threshold: u32,
    open_duration: Duration,
    state: Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(service: impl Into<String>, failure_threshold: u32, open_duration: Duration) -> Self {
        Self {
            service: service.into(),
            failure_threshold,
            open_duration,
            state: Mutex::new(State::Closed { consecutive_failures: 0 }),
        }
    }

    /// 10 failures / 60s.
    pub fn for_rpc(service: impl Into<String>) -> Self {
        Self::new(service, 10, Duration::from_secs(60))
    }

    fn guard(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        match *state {
            State::Closed { .. } => Ok(()),
            State::Open { opened_at } => {
                if opened_at.elapsed() >= self.open_duration {
                    *state = State::Closed { consecutive_failures: 0 };
                    Ok(())
                } else {
                    Err(EngineError::CircuitOpen { service: self.service.clone() })
                }
            }
        }
    }

    fn record_success(&self) {
        *self.state.lock() = State::Closed { consecutive_failures: 0 };
    }

    fn record_failure(&self) {
        let mut state = self.state.lock();
        let next_failures = match *state {
            State::Closed { consecutive_failures } => consecutive_failures + 1,
            State::Open { .. } => self.failure_threshold,
        };
        if next_failures >= self.failure_threshold {
            warn!(service = %self.service, next_failures, "circuit breaker opening");
            *state = State::Open { opened_at: Instant::now() };
        } else {
            *state = State::Closed { consecutive_failures: next_failures };
        }
    }

    /// Run `call` under the breaker and a per-call deadline. A timeout
    /// counts as a failure for breaker purposes, same as an `Err` result.
    pub async fn call<F, Fut, T>(&self, deadline: Duration, call: F) -> Result<T, EngineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        self.guard()?;
        match tokio::time::timeout(deadline, call()).await {
            Ok(Ok(value)) => {
                self.record_success();
                Ok(value)
            }
            Ok(Err(err)) => {
                self.record_failure();
                Err(err)
            }
            Err(_) => {
                self.record_failure();
                Err(EngineError::UpstreamTimeout {
                    service: self.service.clone(),
                    deadline_ms: deadline.as_millis() as u64,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_after_threshold_failures() {
        let breaker = CircuitBreaker::new("ticket-svc", 2, Duration::from_secs(60));
        for _ in 0..2 {
            let result: Result<(), EngineError> = breaker
                .call(Duration::from_millis(50), || async {
                    Err(EngineError::UpstreamUnavailable { service: "ticket-svc".into(), reason: "boom".into() })
                })
                .await;
            assert!(result.is_err());
        }

        let result: Result<(), EngineError> = breaker.call(Duration::from_millis(50), || async { Ok(()) }).await;
        assert!(matches!(result, Err(EngineError::CircuitOpen { .. })));
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        let breaker = CircuitBreaker::new("ticket-svc", 2, Duration::from_secs(60));
        let _: Result<(), EngineError> = breaker
            .call(Duration::from_millis(50), || async {
                Err(EngineError::UpstreamUnavailable { service: "ticket-svc".into(), reason: "boom".into() })
            })
            .await;
        let ok: Result<(), EngineError> = breaker.call(Duration::from_millis(50), || async { Ok(()) }).await;
        assert!(ok.is_ok());
        let _: Result<(), EngineError> = breaker
            .call(Duration::from_millis(50), || async {
                Err(EngineError::UpstreamUnavailable { service: "ticket-svc".into(), reason: "boom".into() })
            })
            .await;
        // Only one consecutive failure recorded since the reset - still closed.
        let ok: Result<(), EngineError> = breaker.call(Duration::from_millis(50), || async { Ok(()) }).await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn slow_call_times_out_and_counts_as_failure() {
        let breaker = CircuitBreaker::new("user-svc", 1, Duration::from_secs(60));
        let result: Result<(), EngineError> = breaker
            .call(Duration::from_millis(10), || async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(EngineError::UpstreamTimeout { .. })));

        let result: Result<(), EngineError> = breaker.call(Duration::from_millis(10), || async { Ok(()) }).await;
        assert!(matches!(result, Err(EngineError::CircuitOpen { .. })));
    }
}
