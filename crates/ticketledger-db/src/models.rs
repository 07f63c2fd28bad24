//! Database models - mapped from PostgreSQL tables, plus the `TryFrom`
//! conversions to/from the domain aggregates in `ticketledger-types`. Money
//! columns are `rust_decimal::Decimal`; JSON-shaped fields (`metadata`,
//! `charge_data`, `settlement_data`, `bank_details`, `tiers`) are stored as
//! `jsonb` and round-tripped through `serde_json::Value`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use ticketledger_types::{
    BankDetails, ChargeData, ChargeSetting, ChargeSettingVersion, ChargeTier, EngineError, Money,
    Result, SettlementData, Transaction, TransactionDirection, TransactionSource, TransactionType,
    Wallet,
};

// ============================================================================
// transactions
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbTransaction {
    pub id: String,
    pub reference: String,
    pub amount: Decimal,
    pub user_id: String,
    pub resource: String,
    pub resource_id: Option<String>,
    pub source: String,
    pub transaction_type: String,
    pub transaction_direction: String,
    pub settlement_status: String,
    pub charge_data: Option<serde_json::Value>,
    pub settlement_data: serde_json::Value,
    pub metadata: serde_json::Value,
    pub parent_id: Option<String>,
    pub occurred_on: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub delayed_settlement_until: Option<DateTime<Utc>>,
}

fn parse_transaction_type(s: &str) -> Result<TransactionType> {
    match s {
        "purchase" => Ok(TransactionType::Purchase),
        "wallet_funding" => Ok(TransactionType::WalletFunding),
        "sale" => Ok(TransactionType::Sale),
        "commission" => Ok(TransactionType::Commission),
        "withdrawal" => Ok(TransactionType::Withdrawal),
        other => Err(EngineError::internal(format!("unknown transaction_type '{other}' in row"))),
    }
}

fn transaction_type_str(t: TransactionType) -> &'static str {
    match t {
        TransactionType::Purchase => "purchase",
        TransactionType::WalletFunding => "wallet_funding",
        TransactionType::Sale => "sale",
        TransactionType::Commission => "commission",
        TransactionType::Withdrawal => "withdrawal",
    }
}

fn parse_direction(s: &str) -> Result<TransactionDirection> {
    match s {
        "credit" => Ok(TransactionDirection::Credit),
        "debit" => Ok(TransactionDirection::Debit),
        other => Err(EngineError::internal(format!("unknown transaction_direction '{other}' in row"))),
    }
}

fn direction_str(d: TransactionDirection) -> &'static str {
    match d {
        TransactionDirection::Credit => "credit",
        TransactionDirection::Debit => "debit",
    }
}

fn parse_source(s: &str) -> Result<TransactionSource> {
    match s {
        "wallet" => Ok(TransactionSource::Wallet),
        "payment_provider" => Ok(TransactionSource::PaymentProvider),
        other => Err(EngineError::internal(format!("unknown source '{other}' in row"))),
    }
}

fn source_str(s: TransactionSource) -> &'static str {
    match s {
        TransactionSource::Wallet => "wallet",
        TransactionSource::PaymentProvider => "payment_provider",
    }
}

fn parse_settlement_status(s: &str) -> Result<ticketledger_types::SettlementStatus> {
    use ticketledger_types::SettlementStatus::*;
    match s {
        "pending" => Ok(Pending),
        "scheduled" => Ok(Scheduled),
        "processing" => Ok(Processing),
        "completed" => Ok(Completed),
        "failed" => Ok(Failed),
        "not_applicable" => Ok(NotApplicable),
        other => Err(EngineError::internal(format!("unknown settlement_status '{other}' in row"))),
    }
}

fn settlement_status_str(s: ticketledger_types::SettlementStatus) -> &'static str {
    use ticketledger_types::SettlementStatus::*;
    match s {
        Pending => "pending",
        Scheduled => "scheduled",
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
        NotApplicable => "not_applicable",
    }
}

impl DbTransaction {
    pub fn into_domain(self) -> Result<Transaction> {
        let metadata = serde_json::from_value(self.metadata)
            .map_err(|e| EngineError::internal(format!("bad metadata json: {e}")))?;
        let charge_data: Option<ChargeData> = self
            .charge_data
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| EngineError::internal(format!("bad charge_data json: {e}")))?;
        let settlement_data: Vec<SettlementData> = serde_json::from_value(self.settlement_data)
            .map_err(|e| EngineError::internal(format!("bad settlement_data json: {e}")))?;

        Ok(Transaction::from_parts(
            self.id,
            self.reference,
            Money::new(self.amount),
            self.user_id,
            self.resource,
            self.resource_id,
            parse_source(&self.source)?,
            parse_transaction_type(&self.transaction_type)?,
            parse_direction(&self.transaction_direction)?,
            parse_settlement_status(&self.settlement_status)?,
            charge_data,
            settlement_data,
            metadata,
            self.parent_id,
            self.occurred_on,
            self.created_at,
            self.delayed_settlement_until,
        ))
    }

    pub fn from_domain(txn: &Transaction) -> Result<Self> {
        Ok(Self {
            id: txn.id.clone(),
            reference: txn.reference.clone(),
            amount: txn.amount.as_decimal(),
            user_id: txn.user_id.clone(),
            resource: txn.resource.clone(),
            resource_id: txn.resource_id.clone(),
            source: source_str(txn.source).to_string(),
            transaction_type: transaction_type_str(txn.transaction_type).to_string(),
            transaction_direction: direction_str(txn.transaction_direction).to_string(),
            settlement_status: settlement_status_str(txn.settlement_status).to_string(),
            charge_data: txn
                .charge_data
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| EngineError::internal(format!("charge_data serialization failed: {e}")))?,
            settlement_data: serde_json::to_value(&txn.settlement_data)
                .map_err(|e| EngineError::internal(format!("settlement_data serialization failed: {e}")))?,
            metadata: serde_json::to_value(&txn.metadata)
                .map_err(|e| EngineError::internal(format!("metadata serialization failed: {e}")))?,
            parent_id: txn.parent_id.clone(),
            occurred_on: txn.occurred_on,
            created_at: txn.created_at,
            delayed_settlement_until: txn.delayed_settlement_until,
        })
    }
}

// ============================================================================
// wallets
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbWallet {
    pub id: String,
    pub user_id: String,
    pub balance: Decimal,
    pub pending_balance: Decimal,
    pub txn_pin: Option<String>,
    pub pin_updated_at: Option<DateTime<Utc>>,
    pub bank_details: Option<serde_json::Value>,
}

impl DbWallet {
    pub fn into_domain(self) -> Result<Wallet> {
        let bank_details: Option<BankDetails> = self
            .bank_details
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| EngineError::internal(format!("bad bank_details json: {e}")))?;
        Ok(Wallet::from_parts(
            self.id,
            self.user_id,
            Money::new(self.balance),
            Money::new(self.pending_balance),
            self.txn_pin,
            self.pin_updated_at,
            bank_details,
        ))
    }

    pub fn from_domain(wallet: &Wallet) -> Result<Self> {
        Ok(Self {
            id: wallet.id.clone(),
            user_id: wallet.user_id.clone(),
            balance: wallet.balance.as_decimal(),
            pending_balance: wallet.pending_balance.as_decimal(),
            txn_pin: wallet.txn_pin.clone(),
            pin_updated_at: wallet.pin_updated_at,
            bank_details: wallet
                .bank_details
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| EngineError::internal(format!("bank_details serialization failed: {e}")))?,
        })
    }
}

// ============================================================================
// charge_settings / charge_setting_versions
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbChargeSetting {
    pub id: String,
    pub name: String,
    pub charge_type: String,
}

impl From<DbChargeSetting> for ChargeSetting {
    fn from(row: DbChargeSetting) -> Self {
        ChargeSetting { id: row.id, name: row.name, charge_type: row.charge_type }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbChargeSettingVersion {
    pub version_id: String,
    pub charge_setting_id: String,
    pub version_number: i32,
    pub effective_from: DateTime<Utc>,
    pub effective_until: Option<DateTime<Utc>>,
    pub tiers: serde_json::Value,
}

impl DbChargeSettingVersion {
    pub fn into_domain(self) -> Result<ChargeSettingVersion> {
        let tiers: Vec<ChargeTier> = serde_json::from_value(self.tiers)
            .map_err(|e| EngineError::internal(format!("bad tiers json: {e}")))?;
        Ok(ChargeSettingVersion {
            version_id: self.version_id,
            charge_setting_id: self.charge_setting_id,
            version_number: self.version_number,
            effective_from: self.effective_from,
            effective_until: self.effective_until,
            tiers,
        })
    }
}
