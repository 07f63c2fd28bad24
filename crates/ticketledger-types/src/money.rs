//! Fixed-point money: scale-2 decimal amounts for a single-currency ledger.
//!
//! Multi-currency is an explicit non-goal, so unlike a general ledger type
//! there is no currency tag here — just a `Decimal` clamped to 2 places and
//! the HALF_UP quantization the charge evaluator and settlement splitter
//! both depend on.

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::{EngineError, Result};

/// A non-negative-by-convention, scale-2 monetary amount.
///
/// `Money` does not itself forbid negative values (subtraction needs to be
/// able to produce a negative the caller rejects with a domain-specific
/// error message), but every public constructor and aggregate invariant
/// enforces non-negativity where the data model requires it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Construct from a `Decimal`, rounding HALF_UP to 2 places.
    pub fn new(value: Decimal) -> Self {
        Self(value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Construct from minor units (e.g. kobo/cents), as providers send.
    pub fn from_minor_units(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    pub fn to_minor_units(self) -> i64 {
        (self.0 * dec!(100)).round().to_i64().unwrap_or(0)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Guard used throughout the aggregates: `amount > 0`.
    pub fn require_positive(self, field: &str) -> Result<Self> {
        if self.is_positive() {
            Ok(self)
        } else {
            Err(EngineError::NonPositiveAmount {
                amount: format!("{} ({})", self.0, field),
            })
        }
    }

    pub fn checked_add(self, other: Money) -> Money {
        Money::new(self.0 + other.0)
    }

    pub fn checked_sub(self, other: Money) -> Money {
        Money::new(self.0 - other.0)
    }

    /// `self * percent / 100`, rounded HALF_UP to 2 places. `percent` is a
    /// decimal percentage, e.g. `dec!(5.0)` for 5%.
    pub fn percentage_of(self, percent: Decimal) -> Money {
        Money::new(self.0 * percent / dec!(100))
    }

    /// `self * fraction`, rounded HALF_UP to 2 places. Used for the 12%
    /// referral share and its 50/50 split.
    pub fn fraction_of(self, fraction: Decimal) -> Money {
        Money::new(self.0 * fraction)
    }

    pub fn clamp(self, min: Option<Money>, max: Option<Money>) -> Money {
        let mut v = self;
        if let Some(min) = min {
            if v < min {
                v = min;
            }
        }
        if let Some(max) = max {
            if v > max {
                v = max;
            }
        }
        v
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        self.checked_add(rhs)
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        self.checked_sub(rhs)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Money::checked_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_up_rounding_matches_referral_share_example() {
        let fee = Money::new(dec!(500));
        let share = fee.fraction_of(dec!(0.12));
        assert_eq!(share, Money::new(dec!(60.00)));
    }

    #[test]
    fn half_up_rounds_midpoint_away_from_zero() {
        let m = Money::new(dec!(1.005));
        assert_eq!(m.to_string(), "1.01");
    }

    #[test]
    fn minor_units_round_trip() {
        let m = Money::from_minor_units(1_000_000);
        assert_eq!(m.to_string(), "10000.00");
        assert_eq!(m.to_minor_units(), 1_000_000);
    }

    #[test]
    fn require_positive_rejects_zero() {
        assert!(Money::ZERO.require_positive("amount").is_err());
    }
}
