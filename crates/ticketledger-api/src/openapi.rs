//! OpenAPI documentation for the ticket settlement API.

use utoipa::OpenApi;

use crate::dto;
use crate::error::ErrorResponse;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ticket Ledger API",
        description = "Ticket-purchase charge calculation, checkout, and wallet/withdrawal settlement.",
        version = "1.0.0"
    ),
    paths(
        handlers::health::healthz,
        handlers::charges::ticket_purchase_charge,
        handlers::charges::instant_withdrawal_charge,
        handlers::checkout::create_ticket_purchase_checkout,
        handlers::checkout::verify_ticket_purchase_checkout,
        handlers::wallet::wallet_balance,
        handlers::wallet::wallet_transactions,
        handlers::wallet::update_transaction_pin,
        handlers::wallet::update_bank_details,
        handlers::wallet::submit_withdrawal,
        handlers::wallet::resolve_personal_account,
        handlers::wallet::list_banks,
        handlers::webhook::paystack_webhook,
        handlers::admin::update_transaction_status,
    ),
    components(
        schemas(
            ErrorResponse,
            dto::SuccessResponse,
            dto::AdminTransitionRequest,
            dto::UpdateTransactionStatusRequest,
            dto::TicketPurchaseChargeQuery,
            dto::InstantWithdrawalChargeQuery,
            dto::ChargeTokenResponse,
            dto::CreateCheckoutRequest,
            dto::CheckoutLinkResponse,
            dto::VerifyCheckoutRequest,
            dto::TransactionView,
            dto::WalletBalanceResponse,
            dto::UpdatePinRequest,
            dto::UpdateBankRequest,
            dto::WithdrawRequest,
            dto::ResolvePersonalAccountQuery,
            dto::ResolvedAccountResponse,
            dto::BankItemView,
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Charges", description = "Signed charge token issuance"),
        (name = "Checkout", description = "Ticket purchase checkout and verification"),
        (name = "Wallet", description = "Wallet balance, bank details, and withdrawals"),
        (name = "Webhook", description = "Inbound payment provider webhooks"),
        (name = "Admin", description = "Operator-only transaction status overrides")
    )
)]
pub struct ApiDoc;

pub fn openapi_json() -> String {
    ApiDoc::openapi().to_json().expect("failed to serialize OpenAPI spec")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_generation_includes_title() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Ticket Ledger API");
    }

    #[test]
    fn openapi_json_is_well_formed() {
        let json = openapi_json();
        assert!(json.contains("Ticket Ledger API"));
    }
}
