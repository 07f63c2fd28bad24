//! DTOs for the ticket-purchase checkout flow.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use ticketledger_types::Money;

/// Everything the client echoes back from its `ChargeTokenResponse`, plus
/// the fields `create_checkout_link` needs that were never part of the
/// signature (`email`, `callback_url`, `reservation_id`). `base_amount` is
/// re-fetched from `TicketService` server-side rather than trusted from
/// the request, so it isn't part of this DTO.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCheckoutRequest {
    pub reservation_id: String,
    pub charge_setting_id: String,
    pub version_id: String,
    pub version_number: i32,
    pub calculated_charge: Money,
    pub ticket_type_id: String,
    pub slug: String,
    pub signature: String,
    pub email: String,
    pub callback_url: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckoutLinkResponse {
    pub checkout_url: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VerifyCheckoutRequest {
    pub reference: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionView {
    pub reference: String,
    pub amount: Money,
    pub transaction_type: String,
    pub settlement_status: String,
    pub occurred_on: chrono::DateTime<chrono::Utc>,
}

impl From<&ticketledger_types::Transaction> for TransactionView {
    fn from(txn: &ticketledger_types::Transaction) -> Self {
        Self {
            reference: txn.reference.clone(),
            amount: txn.amount,
            transaction_type: format!("{:?}", txn.transaction_type).to_lowercase(),
            settlement_status: format!("{:?}", txn.settlement_status).to_lowercase(),
            occurred_on: txn.occurred_on,
        }
    }
}
