//! Outbound payment-provider integration (Paystack-shaped): checkout
//! link creation, transaction verification, bank list/resolution, and
//! recipient + transfer dispatch, built with the same reqwest plumbing
//! used elsewhere in this codebase (one `reqwest::Client`, one base
//! URL, JSON in and out, bail with a plain message on a non-success
//! status).

use async_trait::async_trait;
use serde::Deserialize;
use ticketledger_types::{EngineError, Money};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::PaymentConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct BankItem {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct PersonalAccount {
    pub account_name: String,
    pub account_number: String,
    pub bank_code: String,
    pub bank_name: String,
}

#[derive(Debug, Clone)]
pub struct ExternalTransaction {
    pub reference: String,
    pub amount: Money,
    pub metadata: Option<serde_json::Value>,
}

#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    async fn create_checkout_link(
        &self,
        email: &str,
        amount: Money,
        callback_url: &str,
        reference: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<String, EngineError>;

    async fn get_valid_transaction(&self, reference: &str) -> Result<ExternalTransaction, EngineError>;

    async fn list_banks(&self) -> Result<Vec<BankItem>, EngineError>;

    async fn resolve_personal_bank(&self, bank_code: &str, account_number: &str) -> Result<PersonalAccount, EngineError>;

    async fn add_recipient(&self, account_number: &str, account_name: &str, bank_code: &str) -> Result<String, EngineError>;

    async fn withdraw(&self, amount: Money, recipient_id: &str, reference: &str, reason: &str) -> Result<(), EngineError>;
}

#[derive(Debug, Deserialize)]
struct BaseRes {
    status: bool,
}

#[derive(Debug, Deserialize)]
struct BaseResWithData<T> {
    status: bool,
    data: T,
}

#[derive(Debug, Deserialize)]
struct InitiateTransactionData {
    authorization_url: String,
}

#[derive(Debug, Deserialize)]
struct VerifyTransactionData {
    status: String,
    reference: String,
    amount: i64,
    metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PersonalAccountData {
    account_number: String,
    account_name: String,
}

#[derive(Debug, Deserialize)]
struct RecipientData {
    recipient_code: String,
}

pub struct PaystackAdapter {
    client: reqwest::Client,
    config: PaymentConfig,
    breaker: CircuitBreaker,
}

impl PaystackAdapter {
    pub fn new(config: PaymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            breaker: CircuitBreaker::for_rpc("paystack"),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn json<T: serde::de::DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, EngineError> {
        if !resp.status().is_success() {
            return Err(EngineError::UpstreamUnavailable {
                service: "paystack".into(),
                reason: format!("HTTP {}", resp.status()),
            });
        }
        resp.json::<T>().await.map_err(|e| EngineError::UpstreamUnavailable {
            service: "paystack".into(),
            reason: format!("could not parse response: {e}"),
        })
    }
}

#[async_trait]
impl PaymentAdapter for PaystackAdapter {
    async fn create_checkout_link(
        &self,
        email: &str,
        amount: Money,
        callback_url: &str,
        reference: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<String, EngineError> {
        let mut payload = serde_json::json!({
            "email": email,
            "amount": amount.to_minor_units().to_string(),
            "reference": reference,
            "callback_url": callback_url,
        });
        if let Some(metadata) = metadata {
            payload["metadata"] = serde_json::Value::String(metadata.to_string());
        }

        let client = &self.client;
        let secret_key = self.config.secret_key.clone();
        let url = self.url("/transaction/initialize");
        let resp = self
            .breaker
            .call(std::time::Duration::from_secs(5), || async {
                client
                    .post(&url)
                    .bearer_auth(&secret_key)
                    .json(&payload)
                    .send()
                    .await
                    .map_err(|e| EngineError::UpstreamUnavailable { service: "paystack".into(), reason: e.to_string() })
            })
            .await?;

        let parsed: InitiateTransactionData = self.json::<BaseResWithData<InitiateTransactionData>>(resp).await?.data;
        Ok(parsed.authorization_url)
    }

    async fn get_valid_transaction(&self, reference: &str) -> Result<ExternalTransaction, EngineError> {
        let client = &self.client;
        let secret_key = self.config.secret_key.clone();
        let url = self.url(&format!("/transaction/verify/{reference}"));
        let resp = self
            .breaker
            .call(std::time::Duration::from_secs(5), || async {
                client
                    .get(&url)
                    .bearer_auth(&secret_key)
                    .send()
                    .await
                    .map_err(|e| EngineError::UpstreamUnavailable { service: "paystack".into(), reason: e.to_string() })
            })
            .await?;

        let parsed: BaseResWithData<VerifyTransactionData> = self.json(resp).await?;
        if !parsed.status || parsed.data.status != "success" {
            return Err(EngineError::MalformedProviderTransaction {
                reference: reference.to_string(),
                reason: "provider transaction was not successful".into(),
            });
        }

        Ok(ExternalTransaction {
            reference: parsed.data.reference,
            amount: Money::from_minor_units(parsed.data.amount),
            metadata: parsed.data.metadata,
        })
    }

    async fn list_banks(&self) -> Result<Vec<BankItem>, EngineError> {
        let client = &self.client;
        let secret_key = self.config.secret_key.clone();
        let url = self.url("/bank");
        let resp = self
            .breaker
            .call(std::time::Duration::from_secs(5), || async {
                client
                    .get(&url)
                    .bearer_auth(&secret_key)
                    .query(&[("country", "nigeria"), ("perPage", "100")])
                    .send()
                    .await
                    .map_err(|e| EngineError::UpstreamUnavailable { service: "paystack".into(), reason: e.to_string() })
            })
            .await?;

        let mut banks: Vec<BankItem> = self.json::<BaseResWithData<Vec<BankItem>>>(resp).await?.data;
        if self.config.debug {
            banks.push(BankItem { code: "001".into(), name: "Test Bank".into() });
        }
        Ok(banks)
    }

    async fn resolve_personal_bank(&self, bank_code: &str, account_number: &str) -> Result<PersonalAccount, EngineError> {
        let client = &self.client;
        let secret_key = self.config.secret_key.clone();
        let url = self.url("/bank/resolve");
        let bank_code_owned = bank_code.to_string();
        let account_number_owned = account_number.to_string();
        let resp = self
            .breaker
            .call(std::time::Duration::from_secs(5), || async {
                client
                    .get(&url)
                    .bearer_auth(&secret_key)
                    .query(&[("account_number", &account_number_owned), ("bank_code", &bank_code_owned)])
                    .send()
                    .await
                    .map_err(|e| EngineError::UpstreamUnavailable { service: "paystack".into(), reason: e.to_string() })
            })
            .await?;

        let parsed: PersonalAccountData = self.json::<BaseResWithData<PersonalAccountData>>(resp).await?.data;

        let banks = self.list_banks().await?;
        let bank = banks
            .into_iter()
            .find(|b| b.code == bank_code)
            .ok_or_else(|| EngineError::invalid_input("bank_code", "bank could not be resolved"))?;

        Ok(PersonalAccount {
            account_name: parsed.account_name,
            account_number: parsed.account_number,
            bank_code: bank_code.to_string(),
            bank_name: bank.name,
        })
    }

    async fn add_recipient(&self, account_number: &str, account_name: &str, bank_code: &str) -> Result<String, EngineError> {
        let payload = serde_json::json!({
            "type": "nuban",
            "name": account_name,
            "account_number": account_number,
            "bank_code": bank_code,
            "currency": "NGN",
        });

        let client = &self.client;
        let secret_key = self.config.secret_key.clone();
        let url = self.url("/transferrecipient");
        let resp = self
            .breaker
            .call(std::time::Duration::from_secs(5), || async {
                client
                    .post(&url)
                    .bearer_auth(&secret_key)
                    .json(&payload)
                    .send()
                    .await
                    .map_err(|e| EngineError::UpstreamUnavailable { service: "paystack".into(), reason: e.to_string() })
            })
            .await?;

        let parsed: RecipientData = self.json::<BaseResWithData<RecipientData>>(resp).await?.data;
        Ok(parsed.recipient_code)
    }

    async fn withdraw(&self, amount: Money, recipient_id: &str, reference: &str, reason: &str) -> Result<(), EngineError> {
        let payload = serde_json::json!({
            "source": "balance",
            "amount": amount.to_minor_units().to_string(),
            "recipient": recipient_id,
            "reference": reference,
            "reason": reason,
        });

        let client = &self.client;
        let secret_key = self.config.secret_key.clone();
        let url = self.url("/transfer");
        let resp = self
            .breaker
            .call(std::time::Duration::from_secs(5), || async {
                client
                    .post(&url)
                    .bearer_auth(&secret_key)
                    .json(&payload)
                    .send()
                    .await
                    .map_err(|e| EngineError::UpstreamUnavailable { service: "paystack".into(), reason: e.to_string() })
            })
            .await?;

        let parsed: BaseRes = self.json(resp).await?;
        if !parsed.status {
            return Err(EngineError::UpstreamUnavailable {
                service: "paystack".into(),
                reason: "transfer request was rejected".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_round_trip_through_money() {
        let amount = Money::from_minor_units(150_00);
        assert_eq!(amount.to_minor_units(), 150_00);
    }
}
