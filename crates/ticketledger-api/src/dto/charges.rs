//! DTOs for the signed charge-token endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use ticketledger_types::Money;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TicketPurchaseChargeQuery {
    pub ticket_type_id: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct InstantWithdrawalChargeQuery {
    pub amount: Decimal,
}

/// The signed token handed back to the client: every field here except
/// `signature` is part of the HMAC-SHA256 input, so the client must echo
/// them back verbatim on checkout/withdrawal for the signature to verify.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChargeTokenResponse {
    pub charge_setting_id: String,
    pub version_id: String,
    pub version_number: i32,
    pub base_amount: Money,
    pub calculated_charge: Money,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub signature: String,
}
