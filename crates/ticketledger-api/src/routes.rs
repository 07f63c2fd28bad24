//! Route definitions.

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::middleware::body_limit_middleware;
use crate::state::AppState;

const WEBHOOK_BODY_LIMIT_BYTES: usize = 64 * 1024;

fn charges_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ticket-purchase", get(handlers::charges::ticket_purchase_charge))
        .route("/instant-withdrawal", get(handlers::charges::instant_withdrawal_charge))
}

fn checkout_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ticket-purchase", post(handlers::checkout::create_ticket_purchase_checkout))
        .route("/verify-ticket-purchase", post(handlers::checkout::verify_ticket_purchase_checkout))
}

fn wallet_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/balance", get(handlers::wallet::wallet_balance))
        .route("/transactions", get(handlers::wallet::wallet_transactions))
        .route("/update-transaction-pin", post(handlers::wallet::update_transaction_pin))
        .route("/update-bank", post(handlers::wallet::update_bank_details))
        .route("/withdraw", post(handlers::wallet::submit_withdrawal))
        .route("/resolve-personal-account", get(handlers::wallet::resolve_personal_account))
        .route("/banks", get(handlers::wallet::list_banks))
}

fn webhook_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/paystack", post(handlers::webhook::paystack_webhook))
        .layer(from_fn(|req, next| body_limit_middleware(req, next, WEBHOOK_BODY_LIMIT_BYTES)))
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/transactions/:reference/status", post(handlers::admin::update_transaction_status))
}

pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/charges", charges_routes())
        .nest("/checkout", checkout_routes())
        .nest("/wallet", wallet_routes())
        .nest("/webhook", webhook_routes())
        .nest("/admin", admin_routes())
}

pub fn swagger_routes() -> Router<Arc<AppState>> {
    use crate::openapi::ApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
