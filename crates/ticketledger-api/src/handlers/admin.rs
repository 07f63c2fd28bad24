//! `POST /v1/admin/transactions/{reference}/status` - the one admin flow the CLI drives over HTTP, for manual-mode
//! withdrawals a human operator is resolving. No admin auth layer exists
//! in this crate (it trusts whatever fronts it, same as `X-User-ID` for
//! the rest of the surface); this route is the sole reason the CLI binary
//! exists at all.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use ticketledger_types::EngineError;
use ticketledger_usecases::AdminTransition;

use crate::dto::{AdminTransitionRequest, SuccessResponse, UpdateTransactionStatusRequest};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/v1/admin/transactions/{reference}/status",
    tag = "Admin",
    params(("reference" = String, Path, description = "Transaction reference")),
    request_body = UpdateTransactionStatusRequest,
    responses((status = 200, description = "Status updated", body = SuccessResponse))
)]
pub async fn update_transaction_status(
    State(state): State<Arc<AppState>>,
    Path(reference): Path<String>,
    Json(req): Json<UpdateTransactionStatusRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let transition = match req.status {
        AdminTransitionRequest::Completed => AdminTransition::Completed,
        AdminTransitionRequest::Failed => {
            let reason = req
                .reason
                .ok_or_else(|| ApiError::from(EngineError::invalid_input("reason", "required when status=failed")))?;
            AdminTransition::Failed { reason }
        }
    };

    state.update_transaction_status.execute(&reference, transition).await.map_err(ApiError::from)?;
    Ok(Json(SuccessResponse::ok()))
}
