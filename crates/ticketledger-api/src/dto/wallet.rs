//! DTOs for the wallet endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use ticketledger_adapters::{BankItem, PersonalAccount};
use ticketledger_types::Money;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WalletBalanceResponse {
    pub balance: Money,
    pub pending_balance: Money,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdatePinRequest {
    pub pin: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateBankRequest {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub bank_code: String,
    /// Ties this request to a prior `resolve-personal-account` response so
    /// a client can't bind arbitrary bank details without first resolving
    /// them against the provider.
    pub signature: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WithdrawRequest {
    pub charge_setting_id: String,
    pub version_id: String,
    pub version_number: i32,
    pub calculated_charge: Money,
    pub amount: Money,
    pub signature: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResolvePersonalAccountQuery {
    pub account_number: String,
    pub bank_code: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResolvedAccountResponse {
    pub account_name: String,
    pub account_number: String,
    pub bank_code: String,
    pub bank_name: String,
    pub signature: String,
}

impl ResolvedAccountResponse {
    pub fn new(account: PersonalAccount, signature: String) -> Self {
        Self {
            account_name: account.account_name,
            account_number: account.account_number,
            bank_code: account.bank_code,
            bank_name: account.bank_name,
            signature,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BankItemView {
    pub code: String,
    pub name: String,
}

impl From<BankItem> for BankItemView {
    fn from(bank: BankItem) -> Self {
        Self { code: bank.code, name: bank.name }
    }
}
