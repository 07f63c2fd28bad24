//! Inbound Paystack webhook payload. Only
//! `transfer.success` is acted on; every other event is acknowledged and
//! dropped, per the original handler's dispatch table.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PaystackWebhookPayload {
    pub event: String,
    pub data: PaystackWebhookData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaystackWebhookData {
    pub reference: String,
    /// Minor units, as Paystack reports amounts.
    pub amount: i64,
    #[serde(default)]
    pub recipient: Option<PaystackRecipient>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaystackRecipient {
    pub details: PaystackRecipientDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaystackRecipientDetails {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
}

impl PaystackRecipientDetails {
    /// Matches `BankDetails::build_dest` so a provider-confirmed transfer
    /// reads the same shape in `metadata.dest` as a manual-mode one.
    pub fn build_dest(&self) -> String {
        format!("{} - {} ({})", self.account_name, self.account_number, self.bank_name)
    }
}
