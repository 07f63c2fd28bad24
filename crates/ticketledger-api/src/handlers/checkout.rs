//! `POST /v1/checkout/ticket-purchase` and `POST /v1/checkout/verify-ticket-purchase`.
//! The first step never touches the database - it re-verifies the signed
//! charge token, builds a second metadata payload the payment provider
//! echoes back verbatim, and hands the caller a checkout link. The second
//! step is where a `Transaction` row actually gets created, via
//! `VerifyTicketPurchase`.

use axum::{extract::State, Json};
use std::sync::Arc;

use ticketledger_types::EngineError;

use crate::dto::{CheckoutLinkResponse, CreateCheckoutRequest, TransactionView, VerifyCheckoutRequest};
use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthenticatedUser;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/v1/checkout/ticket-purchase",
    tag = "Checkout",
    request_body = CreateCheckoutRequest,
    responses((status = 200, description = "Checkout link", body = CheckoutLinkResponse))
)]
pub async fn create_ticket_purchase_checkout(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(req): Json<CreateCheckoutRequest>,
) -> ApiResult<Json<CheckoutLinkResponse>> {
    let (valid, reason) = state.tickets.reservation_is_valid(&req.reservation_id).await.map_err(ApiError::from)?;
    if !valid {
        return Err(ApiError::from(EngineError::invalid_input(
            "reservation_id",
            reason.unwrap_or_else(|| "invalid or expired reservation".to_string()),
        )));
    }

    let base_amount = state.tickets.get_ticket_price(&req.ticket_type_id).await.map_err(ApiError::from)?;

    let signed_payload = serde_json::json!({
        "base_amount": base_amount,
        "charge_setting_id": req.charge_setting_id,
        "version_id": req.version_id,
        "version_number": req.version_number,
        "calculated_charge": req.calculated_charge,
        "user": user.user_id,
        "ticket_type": req.ticket_type_id,
        "slug": req.slug,
        "signature": req.signature,
    });
    state.charge_signer.verify_object(&signed_payload).map_err(|_| ApiError::bad_request("invalid or malformed request"))?;

    let metadata_payload = serde_json::json!({
        "charge_setting_id": req.charge_setting_id,
        "version_id": req.version_id,
        "version_number": req.version_number,
        "calculated_charge": req.calculated_charge,
        "ticket_type_id": req.ticket_type_id,
        "slug": req.slug,
        "user": user.user_id,
        "sponsored": false,
    });
    let metadata_signature = state.charge_signer.sign_value(&metadata_payload);
    let mut metadata = metadata_payload;
    metadata["signature"] = serde_json::Value::String(metadata_signature);

    let total_amount = base_amount.checked_add(req.calculated_charge);
    let checkout_url = state
        .payments
        .create_checkout_link(&req.email, total_amount, &req.callback_url, &req.reservation_id, Some(metadata))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(CheckoutLinkResponse { checkout_url }))
}

#[utoipa::path(
    post,
    path = "/v1/checkout/verify-ticket-purchase",
    tag = "Checkout",
    request_body = VerifyCheckoutRequest,
    responses((status = 200, description = "Recorded purchase transaction", body = TransactionView))
)]
pub async fn verify_ticket_purchase_checkout(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(req): Json<VerifyCheckoutRequest>,
) -> ApiResult<Json<TransactionView>> {
    let txn = state.verify_ticket_purchase.execute(&req.reference, &user.user_id).await.map_err(ApiError::from)?;
    Ok(Json(TransactionView::from(&txn)))
}
