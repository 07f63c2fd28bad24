//! The Wallet aggregate: balance, pending, PIN, bound bank details.
//!
//! Balance mutation invariants live here rather than in the repository; the
//! repository is responsible only for the row lock that makes the mutation
//! safe across concurrent tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub bank_code: String,
    pub updated_at: DateTime<Utc>,
}

impl BankDetails {
    /// Human-readable destination string stamped into `metadata.dest` for
    /// manual-mode withdrawals.
    pub fn build_dest(&self) -> String {
        format!("{} - {} ({})", self.account_name, self.account_number, self.bank_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub user_id: String,
    pub balance: Money,
    pub pending_balance: Money,
    /// bcrypt hash; never the plaintext PIN.
    pub txn_pin: Option<String>,
    pub pin_updated_at: Option<DateTime<Utc>>,
    pub bank_details: Option<BankDetails>,
}

impl Wallet {
    /// `get-or-create`: a fresh wallet with zero balances.
    pub fn new(id: String, user_id: String) -> Self {
        Self {
            id,
            user_id,
            balance: Money::ZERO,
            pending_balance: Money::ZERO,
            txn_pin: None,
            pin_updated_at: None,
            bank_details: None,
        }
    }

    /// Rehydrate a `Wallet` already persisted by a repository.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: String,
        user_id: String,
        balance: Money,
        pending_balance: Money,
        txn_pin: Option<String>,
        pin_updated_at: Option<DateTime<Utc>>,
        bank_details: Option<BankDetails>,
    ) -> Self {
        Self {
            id,
            user_id,
            balance,
            pending_balance,
            txn_pin,
            pin_updated_at,
            bank_details,
        }
    }

    pub fn can_withdraw(&self, amount: Money) -> bool {
        self.balance >= amount
    }

    /// Credits `amount` into `balance`. `max_balance` is the optional
    /// `MAX_WALLET_BALANCE` cap from config; `None` means uncapped.
    pub fn deposit(&mut self, amount: Money, max_balance: Option<Money>) -> Result<()> {
        amount.require_positive("amount")?;
        let new_balance = self.balance.checked_add(amount);
        if let Some(max) = max_balance {
            if new_balance > max {
                return Err(EngineError::WalletBalanceCapExceeded {
                    user_id: self.user_id.clone(),
                    attempted: new_balance.to_string(),
                    max: max.to_string(),
                });
            }
        }
        self.balance = new_balance;
        Ok(())
    }

    /// Debits `amount` from `balance`. Fails unless `balance >= amount`.
    pub fn withdraw(&mut self, amount: Money) -> Result<()> {
        amount.require_positive("amount")?;
        if !self.can_withdraw(amount) {
            return Err(EngineError::InsufficientBalance {
                user_id: self.user_id.clone(),
                requested: amount.to_string(),
                available: self.balance.to_string(),
            });
        }
        self.balance = self.balance.checked_sub(amount);
        Ok(())
    }

    /// Atomically moves `amount` from `balance` to `pending_balance`.
    pub fn hold(&mut self, amount: Money) -> Result<()> {
        amount.require_positive("amount")?;
        if !self.can_withdraw(amount) {
            return Err(EngineError::InsufficientBalance {
                user_id: self.user_id.clone(),
                requested: amount.to_string(),
                available: self.balance.to_string(),
            });
        }
        self.balance = self.balance.checked_sub(amount);
        self.pending_balance = self.pending_balance.checked_add(amount);
        Ok(())
    }

    /// Atomically moves `amount` back from `pending_balance` to `balance`.
    pub fn release(&mut self, amount: Money) -> Result<()> {
        amount.require_positive("amount")?;
        if self.pending_balance < amount {
            return Err(EngineError::InsufficientBalance {
                user_id: self.user_id.clone(),
                requested: amount.to_string(),
                available: self.pending_balance.to_string(),
            });
        }
        self.pending_balance = self.pending_balance.checked_sub(amount);
        self.balance = self.balance.checked_add(amount);
        Ok(())
    }

    /// 4-digit numeric PIN policy; the caller hashes before storing.
    pub fn validate_pin_format(pin: &str) -> Result<()> {
        if pin.len() == 4 && pin.chars().all(|c| c.is_ascii_digit()) {
            Ok(())
        } else {
            Err(EngineError::InvalidPin {
                reason: "pin must be exactly 4 digits".into(),
            })
        }
    }

    pub fn set_pin_hash(&mut self, hash: String, now: DateTime<Utc>) {
        self.txn_pin = Some(hash);
        self.pin_updated_at = Some(now);
    }

    pub fn set_bank_details(&mut self, details: BankDetails) {
        self.bank_details = Some(details);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn wallet_with_balance(amount: &str) -> Wallet {
        let mut w = Wallet::new("w1".into(), "u1".into());
        w.balance = Money::new(amount.parse().unwrap());
        w
    }

    #[test]
    fn withdraw_fails_when_insufficient() {
        let mut w = wallet_with_balance("100.00");
        assert!(w.withdraw(Money::new(dec!(150))).is_err());
        assert_eq!(w.balance, Money::new(dec!(100)));
    }

    #[test]
    fn hold_moves_balance_to_pending_atomically() {
        let mut w = wallet_with_balance("100.00");
        w.hold(Money::new(dec!(40))).unwrap();
        assert_eq!(w.balance, Money::new(dec!(60)));
        assert_eq!(w.pending_balance, Money::new(dec!(40)));
    }

    #[test]
    fn release_is_inverse_of_hold() {
        let mut w = wallet_with_balance("100.00");
        w.hold(Money::new(dec!(40))).unwrap();
        w.release(Money::new(dec!(40))).unwrap();
        assert_eq!(w.balance, Money::new(dec!(100)));
        assert_eq!(w.pending_balance, Money::ZERO);
    }

    #[test]
    fn deposit_respects_max_balance_cap() {
        let mut w = wallet_with_balance("900.00");
        let err = w.deposit(Money::new(dec!(200)), Some(Money::new(dec!(1000))));
        assert!(err.is_err());
        assert_eq!(w.balance, Money::new(dec!(900)));
    }

    #[test]
    fn pin_format_requires_four_digits() {
        assert!(Wallet::validate_pin_format("1234").is_ok());
        assert!(Wallet::validate_pin_format("12").is_err());
        assert!(Wallet::validate_pin_format("12a4").is_err());
    }

    #[test]
    fn balances_never_go_negative_across_a_sequence() {
        let mut w = wallet_with_balance("50.00");
        w.deposit(Money::new(dec!(50)), None).unwrap();
        w.hold(Money::new(dec!(30))).unwrap();
        w.withdraw(Money::new(dec!(20))).unwrap();
        w.release(Money::new(dec!(30))).unwrap();
        assert!(!w.balance.is_negative());
        assert!(!w.pending_balance.is_negative());
    }
}
