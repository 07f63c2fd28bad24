//! `transactions set-status` - the one admin flow this CLI exists for.
//! Manual-mode withdrawals land `pending` for a human to resolve; this
//! drives that resolution over HTTP.

use anyhow::Result;

use crate::client::{AdminStatus, ApiClient};
use crate::display;

pub async fn set_status(client: &ApiClient, reference: &str, status: AdminStatus, reason: Option<String>) -> Result<()> {
    display::section("Update transaction status");
    display::labeled("Reference", reference);
    display::labeled("New status", &format!("{status:?}").to_lowercase());

    let response = client.update_transaction_status(reference, status, reason).await?;

    if response.success {
        display::success(response.message.as_deref().unwrap_or("transaction status updated"));
    } else {
        display::warning(response.message.as_deref().unwrap_or("request completed without confirmation"));
    }

    Ok(())
}
