//! `POST /v1/webhook/paystack`. Grounded on the
//! original handler: verify the HMAC-SHA512 signature over the *raw* body
//! before anything else touches it, then dispatch only on
//! `event == "transfer.success"` - every other event is acknowledged and
//! dropped. A successful transfer event is published straight onto the bus
//! rather than run through a use case, matching the original's direct
//! `CompleteWithdrawEvent` publish.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;

use ticketledger_types::{DomainEvent, EventPayload, Money};

use crate::dto::PaystackWebhookPayload;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const TRANSFER_SUCCESS: &str = "transfer.success";

#[utoipa::path(
    post,
    path = "/v1/webhook/paystack",
    tag = "Webhook",
    responses((status = 200, description = "Webhook acknowledged"))
)]
pub async fn paystack_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> ApiResult<StatusCode> {
    let signature = headers
        .get("x-paystack-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("missing x-paystack-signature header"))?;

    state.webhook_verifier.verify(&body, signature).map_err(|_| ApiError::bad_request("invalid webhook signature"))?;

    let payload: PaystackWebhookPayload =
        serde_json::from_slice(&body).map_err(|_| ApiError::bad_request("malformed webhook payload"))?;

    if payload.event != TRANSFER_SUCCESS {
        tracing::debug!(event = %payload.event, "ignoring unhandled paystack webhook event");
        return Ok(StatusCode::OK);
    }

    let reference = payload.data.reference.clone();
    let amount = Money::from_minor_units(payload.data.amount);
    let dest = payload.data.recipient.as_ref().map(|r| r.details.build_dest());

    let Some(txn) = state
        .transactions
        .find_by_reference(&reference)
        .await
        .map_err(|e| ApiError::from(ticketledger_types::EngineError::internal(e.to_string())))?
    else {
        tracing::warn!(reference = %reference, "transfer.success webhook for unknown reference");
        return Ok(StatusCode::OK);
    };

    let event = DomainEvent::new(
        reference.clone(),
        EventPayload::WithdrawalCompleted { reference, amount, user_id: txn.user_id.clone(), dest },
    );
    if let Err(err) = state.bus.publish(event) {
        tracing::error!(error = %err, "failed to publish withdrawal-completed event from webhook");
    }

    Ok(StatusCode::OK)
}
