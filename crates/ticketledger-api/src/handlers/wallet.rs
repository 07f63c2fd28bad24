//! Wallet endpoints: balance, transaction history,
//! PIN and bank-detail updates, withdrawal submission, and the Paystack
//! bank lookups a client needs before it can submit one.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use ticketledger_crypto::hash_pin;
use ticketledger_types::{BankDetails, EngineError, Wallet};
use ticketledger_usecases::SubmitWithdrawalInput;

use crate::dto::{
    BankItemView, PaginatedResponse, ResolvePersonalAccountQuery, ResolvedAccountResponse, TransactionView,
    UpdateBankRequest, UpdatePinRequest, WalletBalanceResponse, WithdrawRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AuthenticatedUser, Pagination};
use crate::state::AppState;

fn db_err(e: impl std::fmt::Display) -> ApiError {
    ApiError::from(EngineError::internal(e.to_string()))
}

async fn wallet_or_default(state: &AppState, user_id: &str) -> ApiResult<Wallet> {
    match state.wallets.find_by_user(user_id).await.map_err(db_err)? {
        Some(wallet) => Ok(wallet),
        None => Ok(Wallet::new(ticketledger_core::id::new_id(), user_id.to_string())),
    }
}

#[utoipa::path(
    get,
    path = "/v1/wallet/balance",
    tag = "Wallet",
    responses((status = 200, description = "Wallet balance", body = WalletBalanceResponse))
)]
pub async fn wallet_balance(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<Json<WalletBalanceResponse>> {
    let wallet = wallet_or_default(&state, &user.user_id).await?;
    Ok(Json(WalletBalanceResponse { balance: wallet.balance, pending_balance: wallet.pending_balance }))
}

#[utoipa::path(
    get,
    path = "/v1/wallet/transactions",
    tag = "Wallet",
    params(("page" = u32, Query,), ("page_size" = u32, Query,)),
    responses((status = 200, description = "Paginated wallet transactions", body = [TransactionView]))
)]
pub async fn wallet_transactions(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Pagination(pagination): Pagination,
) -> ApiResult<Json<PaginatedResponse<TransactionView>>> {
    let limit = pagination.limit(100);
    let offset = pagination.offset();
    let rows = state.transactions.list_by_user(&user.user_id, limit, offset).await.map_err(db_err)?;

    let views: Vec<TransactionView> = rows.iter().map(TransactionView::from).collect();
    Ok(Json(PaginatedResponse::new(views, pagination.page as i64, limit, None)))
}

#[utoipa::path(
    post,
    path = "/v1/wallet/update-transaction-pin",
    tag = "Wallet",
    request_body = UpdatePinRequest,
    responses((status = 200, description = "PIN updated"))
)]
pub async fn update_transaction_pin(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(req): Json<UpdatePinRequest>,
) -> ApiResult<Json<crate::dto::SuccessResponse>> {
    Wallet::validate_pin_format(&req.pin).map_err(ApiError::from)?;
    let hash = hash_pin(&req.pin).map_err(ApiError::from)?;

    let mut db_tx = state.wallets.pool().begin().await.map_err(db_err)?;
    let mut wallet = state.wallets.lock_or_create(&mut db_tx, &user.user_id, ticketledger_core::id::new_id).await.map_err(db_err)?;
    wallet.set_pin_hash(hash, Utc::now());
    state.wallets.update(&mut db_tx, &wallet).await.map_err(db_err)?;
    db_tx.commit().await.map_err(db_err)?;

    Ok(Json(crate::dto::SuccessResponse::ok()))
}

#[utoipa::path(
    post,
    path = "/v1/wallet/update-bank",
    tag = "Wallet",
    request_body = UpdateBankRequest,
    responses((status = 200, description = "Bank details updated"))
)]
pub async fn update_bank_details(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(req): Json<UpdateBankRequest>,
) -> ApiResult<Json<crate::dto::SuccessResponse>> {
    let payload = serde_json::json!({
        "account_name": req.account_name,
        "account_number": req.account_number,
        "bank_name": req.bank_name,
        "bank_code": req.bank_code,
        "user": user.user_id,
        "signature": req.signature,
    });
    state.account_signer.verify_object(&payload).map_err(|_| ApiError::bad_request("invalid or malformed request"))?;

    let mut db_tx = state.wallets.pool().begin().await.map_err(db_err)?;
    let mut wallet = state.wallets.lock_or_create(&mut db_tx, &user.user_id, ticketledger_core::id::new_id).await.map_err(db_err)?;
    wallet.set_bank_details(BankDetails {
        account_name: req.account_name,
        account_number: req.account_number,
        bank_name: req.bank_name,
        bank_code: req.bank_code,
        updated_at: Utc::now(),
    });
    state.wallets.update(&mut db_tx, &wallet).await.map_err(db_err)?;
    db_tx.commit().await.map_err(db_err)?;

    Ok(Json(crate::dto::SuccessResponse::ok()))
}

#[utoipa::path(
    post,
    path = "/v1/wallet/withdraw",
    tag = "Wallet",
    request_body = WithdrawRequest,
    responses((status = 200, description = "Withdrawal submitted", body = TransactionView))
)]
pub async fn submit_withdrawal(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(req): Json<WithdrawRequest>,
) -> ApiResult<Json<TransactionView>> {
    let input = SubmitWithdrawalInput {
        charge_setting_id: req.charge_setting_id,
        version_id: req.version_id,
        version_number: req.version_number,
        calculated_charge: req.calculated_charge,
        amount: req.amount,
        signature: req.signature,
    };
    let txn = state.submit_withdrawal.execute(input, &user.user_id).await.map_err(ApiError::from)?;
    Ok(Json(TransactionView::from(&txn)))
}

#[utoipa::path(
    get,
    path = "/v1/wallet/resolve-personal-account",
    tag = "Wallet",
    params(("account_number" = String, Query,), ("bank_code" = String, Query,)),
    responses((status = 200, description = "Resolved account details", body = ResolvedAccountResponse))
)]
pub async fn resolve_personal_account(
    State(state): State<Arc<AppState>>,
    _user: AuthenticatedUser,
    Query(query): Query<ResolvePersonalAccountQuery>,
) -> ApiResult<Json<ResolvedAccountResponse>> {
    let account =
        state.payments.resolve_personal_bank(&query.bank_code, &query.account_number).await.map_err(ApiError::from)?;

    let payload = serde_json::json!({
        "account_name": account.account_name,
        "account_number": account.account_number,
        "bank_code": account.bank_code,
        "bank_name": account.bank_name,
    });
    let signature = state.account_signer.sign_value(&payload);

    Ok(Json(ResolvedAccountResponse::new(account, signature)))
}

#[utoipa::path(
    get,
    path = "/v1/wallet/banks",
    tag = "Wallet",
    responses((status = 200, description = "Supported banks", body = [BankItemView]))
)]
pub async fn list_banks(
    State(state): State<Arc<AppState>>,
    _user: AuthenticatedUser,
) -> ApiResult<Json<Vec<BankItemView>>> {
    let banks = state.payments.list_banks().await.map_err(ApiError::from)?;
    Ok(Json(banks.into_iter().map(BankItemView::from).collect()))
}
