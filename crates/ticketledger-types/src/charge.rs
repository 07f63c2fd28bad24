//! Read-only data model for the tiered fee schedule. Charge-tier CRUD is out
//! of scope; these types exist so the evaluator
//! (`ticketledger-core`) and the repository (`ticketledger-db`) have a
//! shared shape to read.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeTier {
    pub min_price: Money,
    /// `None` means unbounded above.
    pub max_price: Option<Money>,
    pub percentage_rate: Decimal,
    pub min_charge: Option<Money>,
    pub max_charge: Option<Money>,
}

impl ChargeTier {
    /// Inclusive on both ends: `min_price <= amount <= max_price`.
    pub fn covers(&self, amount: Money) -> bool {
        amount >= self.min_price && self.max_price.map(|max| amount <= max).unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeSettingVersion {
    pub version_id: String,
    pub charge_setting_id: String,
    pub version_number: i32,
    pub effective_from: DateTime<Utc>,
    pub effective_until: Option<DateTime<Utc>>,
    pub tiers: Vec<ChargeTier>,
}

impl ChargeSettingVersion {
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.effective_from <= at && self.effective_until.map(|until| until > at).unwrap_or(true)
    }

    pub fn tier_for(&self, amount: Money) -> Option<&ChargeTier> {
        self.tiers.iter().find(|t| t.covers(amount))
    }

    /// Adjacency check used when validating a schedule: tiers must be
    /// ordered and gap-free under the same inclusive-both-ends rule as
    /// `ChargeTier::covers`, i.e. tier `i+1`'s `min_price` is exactly one
    /// cent above tier `i`'s `max_price`.
    pub fn has_gaps_or_overlaps(&self) -> bool {
        for pair in self.tiers.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let Some(prev_max) = prev.max_price else {
                return true; // an open-ended tier cannot be followed by another
            };
            let expected_next_min = Money::new(prev_max.as_decimal() + rust_decimal_macros::dec!(0.01));
            if next.min_price != expected_next_min {
                return true;
            }
        }
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeSetting {
    pub id: String,
    pub name: String,
    /// Well-known lookup key the charge-issuance endpoints resolve by
    /// (`ticket_purchase`, `instant_withdrawal`), distinct from `id` so a
    /// schedule can be swapped out without clients learning a new id.
    pub charge_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tier(min: &str, max: Option<&str>, rate: Decimal) -> ChargeTier {
        ChargeTier {
            min_price: Money::new(min.parse().unwrap()),
            max_price: max.map(|m| Money::new(m.parse().unwrap())),
            percentage_rate: rate,
            min_charge: None,
            max_charge: None,
        }
    }

    #[test]
    fn tier_boundaries_are_inclusive_both_ends() {
        let t = tier("100.00", Some("500.00"), dec!(5));
        assert!(t.covers(Money::new(dec!(100))));
        assert!(t.covers(Money::new(dec!(500))));
        assert!(!t.covers(Money::new(dec!(99.99))));
        assert!(!t.covers(Money::new(dec!(500.01))));
    }

    #[test]
    fn gap_check_matches_inclusive_covers() {
        let version = ChargeSettingVersion {
            version_id: "v1".into(),
            charge_setting_id: "cs1".into(),
            version_number: 1,
            effective_from: Utc::now(),
            effective_until: None,
            tiers: vec![
                tier("0.00", Some("99.99"), dec!(1)),
                tier("100.00", Some("499.99"), dec!(2)),
            ],
        };
        assert!(!version.has_gaps_or_overlaps());
    }

    #[test]
    fn gap_check_detects_a_hole() {
        let version = ChargeSettingVersion {
            version_id: "v1".into(),
            charge_setting_id: "cs1".into(),
            version_number: 1,
            effective_from: Utc::now(),
            effective_until: None,
            tiers: vec![
                tier("0.00", Some("99.99"), dec!(1)),
                tier("101.00", Some("499.99"), dec!(2)),
            ],
        };
        assert!(version.has_gaps_or_overlaps());
    }
}
