//! Pure computation of the recipient splits for `SettleTicketPurchase`.
//! Building the resulting `Transaction` children is the aggregate's job
//! (`Transaction::create_settlement_transactions`); this module only
//! computes the `SettlementData` list in the mandated order so the system
//! share — last in the chain — absorbs any HALF_UP rounding residue.

use rust_decimal_macros::dec;
use ticketledger_types::{Money, SettlementData, SettlementRole, TransactionType};

#[derive(Debug, Clone, Default)]
pub struct ReferrerInfo {
    pub buyer_referrer: Option<String>,
    pub organizer_referrer: Option<String>,
}

impl ReferrerInfo {
    pub fn any(&self) -> bool {
        self.buyer_referrer.is_some() || self.organizer_referrer.is_some()
    }
}

/// `amount_paid` is the parent transaction's total amount; `fee` is
/// `charge_data.charge_amount`. Returns splits summing exactly to
/// `amount_paid`.
pub fn compute_purchase_splits(
    amount_paid: Money,
    fee: Money,
    organizer_user: &str,
    system_user: &str,
    referrers: &ReferrerInfo,
) -> Vec<SettlementData> {
    let mut splits = Vec::with_capacity(4);

    splits.push(SettlementData {
        amount: amount_paid.checked_sub(fee),
        recipient_user: organizer_user.to_string(),
        transaction_type: TransactionType::Sale,
        role: SettlementRole::Organizer,
    });

    let mut remaining_fee = fee;
    if referrers.any() {
        let referral_share = fee.fraction_of(dec!(0.12));
        remaining_fee = fee.checked_sub(referral_share);

        match (&referrers.buyer_referrer, &referrers.organizer_referrer) {
            (Some(buyer), Some(organizer)) => {
                let half = referral_share.fraction_of(dec!(0.5));
                splits.push(SettlementData {
                    amount: half,
                    recipient_user: buyer.clone(),
                    transaction_type: TransactionType::Commission,
                    role: SettlementRole::Referrer,
                });
                splits.push(SettlementData {
                    amount: half,
                    recipient_user: organizer.clone(),
                    transaction_type: TransactionType::Commission,
                    role: SettlementRole::Referrer,
                });
            }
            (Some(sole), None) | (None, Some(sole)) => {
                splits.push(SettlementData {
                    amount: referral_share,
                    recipient_user: sole.clone(),
                    transaction_type: TransactionType::Commission,
                    role: SettlementRole::Referrer,
                });
            }
            (None, None) => unreachable!("referrers.any() guarantees one is Some"),
        }
    }

    splits.push(SettlementData {
        amount: remaining_fee,
        recipient_user: system_user.to_string(),
        transaction_type: TransactionType::Commission,
        role: SettlementRole::SystemAdmin,
    });

    splits
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn s1_no_referrers() {
        let splits = compute_purchase_splits(
            Money::new(dec!(10000)),
            Money::new(dec!(500)),
            "O",
            "S",
            &ReferrerInfo::default(),
        );
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].amount, Money::new(dec!(9500)));
        assert_eq!(splits[0].recipient_user, "O");
        assert_eq!(splits[1].amount, Money::new(dec!(500)));
        assert_eq!(splits[1].recipient_user, "S");
    }

    #[test]
    fn s2_both_referrers() {
        let referrers = ReferrerInfo {
            buyer_referrer: Some("buyer_ref".into()),
            organizer_referrer: Some("organizer_ref".into()),
        };
        let splits = compute_purchase_splits(
            Money::new(dec!(10000)),
            Money::new(dec!(500)),
            "O",
            "S",
            &referrers,
        );
        assert_eq!(splits.len(), 4);
        assert_eq!(splits[0].amount, Money::new(dec!(9500)));
        assert_eq!(splits[1].amount, Money::new(dec!(30)));
        assert_eq!(splits[1].recipient_user, "buyer_ref");
        assert_eq!(splits[2].amount, Money::new(dec!(30)));
        assert_eq!(splits[2].recipient_user, "organizer_ref");
        assert_eq!(splits[3].amount, Money::new(dec!(440)));

        let sum: Money = splits.iter().map(|s| s.amount).sum();
        assert_eq!(sum, Money::new(dec!(10000)));
    }

    #[test]
    fn s3_buyer_referrer_only() {
        let referrers = ReferrerInfo {
            buyer_referrer: Some("buyer_ref".into()),
            organizer_referrer: None,
        };
        let splits = compute_purchase_splits(
            Money::new(dec!(10000)),
            Money::new(dec!(500)),
            "O",
            "S",
            &referrers,
        );
        assert_eq!(splits.len(), 3);
        assert_eq!(splits[1].amount, Money::new(dec!(60)));
        assert_eq!(splits[1].recipient_user, "buyer_ref");
        assert_eq!(splits[2].amount, Money::new(dec!(440)));
    }

    #[test]
    fn splits_always_sum_to_amount_paid() {
        let referrers = ReferrerInfo {
            buyer_referrer: Some("b".into()),
            organizer_referrer: Some("o".into()),
        };
        let splits = compute_purchase_splits(
            Money::new(dec!(12345.67)),
            Money::new(dec!(617.28)),
            "O",
            "S",
            &referrers,
        );
        let sum: Money = splits.iter().map(|s| s.amount).sum();
        assert_eq!(sum, Money::new(dec!(12345.67)));
    }
}
