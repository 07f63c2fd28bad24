//! Error types for the settlement engine.
//!
//! All errors are explicit: domain guards return `Result`, never panic, and
//! every variant carries enough context to build a JSON error body at the
//! HTTP edge without re-deriving it from a string.

use thiserror::Error;

/// Result type for settlement-engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// The coarse error classification used to pick an HTTP status / CLI exit
/// code. Distinct from `EngineError` itself: several variants share a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Forbidden,
    NotFound,
    Conflict,
    UpstreamUnavailable,
    Malformed,
    NotImplemented,
}

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    // ------------------------------------------------------------------
    // Transaction errors
    // ------------------------------------------------------------------
    #[error("transaction {reference} not found")]
    TransactionNotFound { reference: String },

    #[error("transaction {reference} already exists")]
    TransactionAlreadyExists { reference: String },

    #[error("illegal transition for transaction {reference}: {from} -> {to}")]
    IllegalState {
        reference: String,
        from: String,
        to: String,
    },

    #[error("amount must be strictly positive, got {amount}")]
    NonPositiveAmount { amount: String },

    #[error("settlement_data can only be appended while status is pending (transaction {reference})")]
    SettlementDataAfterPending { reference: String },

    #[error("sum of settlement children ({sum}) does not equal parent amount ({amount}) for transaction {reference}")]
    SettlementSumMismatch {
        reference: String,
        sum: String,
        amount: String,
    },

    // ------------------------------------------------------------------
    // Wallet errors
    // ------------------------------------------------------------------
    #[error("wallet for user {user_id} not found")]
    WalletNotFound { user_id: String },

    #[error("insufficient balance for user {user_id}: requested {requested}, available {available}")]
    InsufficientBalance {
        user_id: String,
        requested: String,
        available: String,
    },

    #[error("wallet balance cap exceeded for user {user_id}: would reach {attempted}, max {max}")]
    WalletBalanceCapExceeded {
        user_id: String,
        attempted: String,
        max: String,
    },

    #[error("invalid transaction pin: {reason}")]
    InvalidPin { reason: String },

    #[error("wallet for user {user_id} has no bank details on file")]
    MissingBankDetails { user_id: String },

    // ------------------------------------------------------------------
    // Charge schedule errors
    // ------------------------------------------------------------------
    #[error("no active charge schedule version for schedule {schedule_id} at the requested time")]
    NoActiveChargeVersion { schedule_id: String },

    #[error("no tier in schedule version {version_id} covers base amount {amount}")]
    NoMatchingTier { version_id: String, amount: String },

    #[error("calculated charge must be greater than zero")]
    ZeroCharge,

    // ------------------------------------------------------------------
    // Signed-token errors
    // ------------------------------------------------------------------
    #[error("signature missing from payload")]
    SignatureMissing,

    #[error("signature verification failed")]
    SignatureMismatch,

    // ------------------------------------------------------------------
    // Use-case / authorization errors
    // ------------------------------------------------------------------
    #[error("authenticated user {actual} does not match transaction owner {expected}")]
    UserMismatch { expected: String, actual: String },

    #[error("provider transaction {reference} is malformed: {reason}")]
    MalformedProviderTransaction { reference: String, reason: String },

    #[error("sponsored charges are not implemented")]
    SponsoredChargeNotImplemented,

    #[error("withdrawal amount mismatch for {reference}: expected {expected}, got {actual}")]
    WithdrawalAmountMismatch {
        reference: String,
        expected: String,
        actual: String,
    },

    #[error("transition {attempted} is not a whitelisted admin transition")]
    UnsupportedAdminTransition { attempted: String },

    // ------------------------------------------------------------------
    // Upstream / adapter errors
    // ------------------------------------------------------------------
    #[error("upstream {service} unavailable: {reason}")]
    UpstreamUnavailable { service: String, reason: String },

    #[error("upstream {service} call timed out after {deadline_ms}ms")]
    UpstreamTimeout { service: String, deadline_ms: u64 },

    #[error("circuit breaker open for {service}")]
    CircuitOpen { service: String },

    // ------------------------------------------------------------------
    // General
    // ------------------------------------------------------------------
    #[error("invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl EngineError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code surfaced in API error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TransactionNotFound { .. } => "TRANSACTION_NOT_FOUND",
            Self::TransactionAlreadyExists { .. } => "TRANSACTION_ALREADY_EXISTS",
            Self::IllegalState { .. } => "ILLEGAL_STATE",
            Self::NonPositiveAmount { .. } => "NON_POSITIVE_AMOUNT",
            Self::SettlementDataAfterPending { .. } => "SETTLEMENT_DATA_AFTER_PENDING",
            Self::SettlementSumMismatch { .. } => "SETTLEMENT_SUM_MISMATCH",
            Self::WalletNotFound { .. } => "WALLET_NOT_FOUND",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::WalletBalanceCapExceeded { .. } => "WALLET_BALANCE_CAP_EXCEEDED",
            Self::InvalidPin { .. } => "INVALID_PIN",
            Self::MissingBankDetails { .. } => "MISSING_BANK_DETAILS",
            Self::NoActiveChargeVersion { .. } => "NO_ACTIVE_CHARGE_VERSION",
            Self::NoMatchingTier { .. } => "NO_MATCHING_TIER",
            Self::ZeroCharge => "ZERO_CHARGE",
            Self::SignatureMissing => "SIGNATURE_MISSING",
            Self::SignatureMismatch => "SIGNATURE_MISMATCH",
            Self::UserMismatch { .. } => "USER_MISMATCH",
            Self::MalformedProviderTransaction { .. } => "MALFORMED_PROVIDER_TRANSACTION",
            Self::SponsoredChargeNotImplemented => "SPONSORED_CHARGE_NOT_IMPLEMENTED",
            Self::WithdrawalAmountMismatch { .. } => "WITHDRAWAL_AMOUNT_MISMATCH",
            Self::UnsupportedAdminTransition { .. } => "UNSUPPORTED_ADMIN_TRANSITION",
            Self::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamTimeout { .. } => "UPSTREAM_TIMEOUT",
            Self::CircuitOpen { .. } => "CIRCUIT_OPEN",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Classification used by the HTTP edge and the CLI to pick a status /
    /// exit code. 
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NonPositiveAmount { .. }
            | Self::InvalidPin { .. }
            | Self::SignatureMismatch
            | Self::SignatureMissing
            | Self::WithdrawalAmountMismatch { .. }
            | Self::UnsupportedAdminTransition { .. }
            | Self::InvalidInput { .. } => ErrorKind::InvalidInput,

            Self::UserMismatch { .. } => ErrorKind::Forbidden,

            Self::TransactionNotFound { .. }
            | Self::WalletNotFound { .. }
            | Self::MissingBankDetails { .. }
            | Self::NoActiveChargeVersion { .. }
            | Self::NoMatchingTier { .. } => ErrorKind::NotFound,

            Self::TransactionAlreadyExists { .. }
            | Self::IllegalState { .. }
            | Self::SettlementDataAfterPending { .. }
            | Self::SettlementSumMismatch { .. }
            | Self::InsufficientBalance { .. }
            | Self::WalletBalanceCapExceeded { .. }
            | Self::ZeroCharge => ErrorKind::Conflict,

            Self::UpstreamUnavailable { .. }
            | Self::UpstreamTimeout { .. }
            | Self::CircuitOpen { .. } => ErrorKind::UpstreamUnavailable,

            Self::MalformedProviderTransaction { .. } => ErrorKind::Malformed,

            Self::SponsoredChargeNotImplemented | Self::Internal { .. } => {
                ErrorKind::NotImplemented
            }
        }
    }

    /// Whether an event-bus handler should be retried (no offset commit) on
    /// this failure, versus a permanent rejection.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable { .. } | Self::UpstreamTimeout { .. } | Self::CircuitOpen { .. } | Self::Internal { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_maps_conflict_for_state_guards() {
        let err = EngineError::IllegalState {
            reference: "r1".into(),
            from: "completed".into(),
            to: "processing".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.error_code(), "ILLEGAL_STATE");
    }

    #[test]
    fn upstream_errors_are_retriable() {
        let err = EngineError::UpstreamTimeout {
            service: "ticket-svc".into(),
            deadline_ms: 500,
        };
        assert!(err.is_retriable());
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }

    #[test]
    fn not_found_is_not_retriable() {
        let err = EngineError::WalletNotFound {
            user_id: "u1".into(),
        };
        assert!(!err.is_retriable());
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
