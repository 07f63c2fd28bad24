//! `GET /v1/charges/ticket-purchase` and `GET /v1/charges/instant-withdrawal`
//!: resolve a well-known charge schedule, evaluate
//! it against the requested base amount, and hand the caller a signed
//! token binding the computation to their identity.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use ticketledger_core::evaluator::{evaluate, pick_active_version};
use ticketledger_types::EngineError;

use crate::dto::{ChargeTokenResponse, InstantWithdrawalChargeQuery, TicketPurchaseChargeQuery};
use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthenticatedUser;
use crate::state::AppState;

const TICKET_PURCHASE_CHARGE_TYPE: &str = "ticket_purchase";
const INSTANT_WITHDRAWAL_CHARGE_TYPE: &str = "instant_withdrawal";

async fn evaluate_by_type(
    state: &AppState,
    charge_type: &str,
    base_amount: ticketledger_types::Money,
) -> Result<ticketledger_core::evaluator::ChargeBreakdown, EngineError> {
    let setting = state
        .charges
        .find_setting_by_type(charge_type)
        .await
        .map_err(|e| EngineError::internal(e.to_string()))?
        .ok_or_else(|| EngineError::NoActiveChargeVersion { schedule_id: charge_type.to_string() })?;
    let versions = state
        .charges
        .list_versions(&setting.id)
        .await
        .map_err(|e| EngineError::internal(e.to_string()))?;
    let version = pick_active_version(&versions, chrono::Utc::now())
        .ok_or_else(|| EngineError::NoActiveChargeVersion { schedule_id: setting.id.clone() })?;
    evaluate(version, base_amount)
}

#[utoipa::path(
    get,
    path = "/v1/charges/ticket-purchase",
    tag = "Charges",
    params(
        ("ticket_type_id" = String, Query, description = "Ticket type to price"),
        ("slug" = String, Query, description = "Event slug")
    ),
    responses((status = 200, description = "Signed charge token", body = ChargeTokenResponse))
)]
pub async fn ticket_purchase_charge(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<TicketPurchaseChargeQuery>,
) -> ApiResult<Json<ChargeTokenResponse>> {
    let base_amount = state.tickets.get_ticket_price(&query.ticket_type_id).await.map_err(ApiError::from)?;
    let breakdown = evaluate_by_type(&state, TICKET_PURCHASE_CHARGE_TYPE, base_amount).await.map_err(ApiError::from)?;

    let payload = serde_json::json!({
        "charge_setting_id": breakdown.charge_setting_id,
        "version_id": breakdown.version_id,
        "version_number": breakdown.version_number,
        "base_amount": breakdown.base_amount,
        "calculated_charge": breakdown.charge_amount,
        "user": user.user_id,
        "ticket_type": query.ticket_type_id,
        "slug": query.slug,
    });
    let signature = state.charge_signer.sign_value(&payload);

    Ok(Json(ChargeTokenResponse {
        charge_setting_id: breakdown.charge_setting_id,
        version_id: breakdown.version_id,
        version_number: breakdown.version_number,
        base_amount: breakdown.base_amount,
        calculated_charge: breakdown.charge_amount,
        user: user.user_id,
        ticket_type: Some(query.ticket_type_id),
        slug: Some(query.slug),
        signature,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/charges/instant-withdrawal",
    tag = "Charges",
    params(("amount" = rust_decimal::Decimal, Query, description = "Requested withdrawal amount")),
    responses((status = 200, description = "Signed charge token", body = ChargeTokenResponse))
)]
pub async fn instant_withdrawal_charge(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<InstantWithdrawalChargeQuery>,
) -> ApiResult<Json<ChargeTokenResponse>> {
    let base_amount = ticketledger_types::Money::new(query.amount);
    let breakdown =
        evaluate_by_type(&state, INSTANT_WITHDRAWAL_CHARGE_TYPE, base_amount).await.map_err(ApiError::from)?;

    let payload = serde_json::json!({
        "charge_setting_id": breakdown.charge_setting_id,
        "version_id": breakdown.version_id,
        "version_number": breakdown.version_number,
        "base_amount": breakdown.base_amount,
        "calculated_charge": breakdown.charge_amount,
        "user": user.user_id,
    });
    let signature = state.charge_signer.sign_value(&payload);

    Ok(Json(ChargeTokenResponse {
        charge_setting_id: breakdown.charge_setting_id,
        version_id: breakdown.version_id,
        version_number: breakdown.version_number,
        base_amount: breakdown.base_amount,
        calculated_charge: breakdown.charge_amount,
        user: user.user_id,
        ticket_type: None,
        slug: None,
        signature,
    }))
}
