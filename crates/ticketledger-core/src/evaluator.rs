//! The Charge Schedule Evaluator: a pure function over
//! an already-loaded, already-validated `ChargeSettingVersion`. Picking the
//! active version (by `effective_from`/`effective_until`) is the
//! repository's job; this module only does the tier lookup and the
//! HALF_UP-quantized fee computation.

use ticketledger_types::{ChargeSettingVersion, ChargeTier, EngineError, Money, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeBreakdown {
    pub charge_setting_id: String,
    pub version_id: String,
    pub version_number: i32,
    pub base_amount: Money,
    pub charge_amount: Money,
}

/// Returns `None` when `effective_until` has already passed, to let the
/// caller choose between `NoActiveChargeVersion` and retrying with a
/// newer version.
pub fn pick_active_version(
    versions: &[ChargeSettingVersion],
    at: chrono::DateTime<chrono::Utc>,
) -> Option<&ChargeSettingVersion> {
    versions.iter().find(|v| v.is_active_at(at))
}

pub fn evaluate(version: &ChargeSettingVersion, base_amount: Money) -> Result<ChargeBreakdown> {
    base_amount.require_positive("base_amount")?;
    let tier: &ChargeTier = version.tier_for(base_amount).ok_or_else(|| EngineError::NoMatchingTier {
        version_id: version.version_id.clone(),
        amount: base_amount.to_string(),
    })?;
    let raw_charge = base_amount.percentage_of(tier.percentage_rate);
    let clamped = raw_charge.clamp(tier.min_charge, tier.max_charge);
    if clamped.is_zero() {
        return Err(EngineError::ZeroCharge);
    }
    Ok(ChargeBreakdown {
        charge_setting_id: version.charge_setting_id.clone(),
        version_id: version.version_id.clone(),
        version_number: version.version_number,
        base_amount,
        charge_amount: clamped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use ticketledger_types::ChargeTier;

    fn tier(min: &str, max: Option<&str>, rate: rust_decimal::Decimal) -> ChargeTier {
        ChargeTier {
            min_price: Money::new(min.parse().unwrap()),
            max_price: max.map(|m| Money::new(m.parse().unwrap())),
            percentage_rate: rate,
            min_charge: None,
            max_charge: None,
        }
    }

    fn version() -> ChargeSettingVersion {
        ChargeSettingVersion {
            version_id: "v1".into(),
            charge_setting_id: "cs1".into(),
            version_number: 1,
            effective_from: Utc::now() - Duration::days(1),
            effective_until: None,
            tiers: vec![
                tier("0.00", Some("9999.99"), dec!(5)),
                tier("10000.00", None, dec!(3)),
            ],
        }
    }

    #[test]
    fn evaluates_tier_at_boundary() {
        let breakdown = evaluate(&version(), Money::new(dec!(10000))).unwrap();
        assert_eq!(breakdown.charge_amount, Money::new(dec!(300)));
    }

    #[test]
    fn rejects_zero_base_amount() {
        assert!(evaluate(&version(), Money::ZERO).is_err());
    }

    #[test]
    fn clamps_to_max_charge() {
        let mut v = version();
        v.tiers[0].max_charge = Some(Money::new(dec!(50)));
        let breakdown = evaluate(&v, Money::new(dec!(5000))).unwrap();
        assert_eq!(breakdown.charge_amount, Money::new(dec!(50)));
    }

    #[test]
    fn rejects_zero_calculated_charge() {
        let mut v = version();
        v.tiers[0].percentage_rate = dec!(0);
        assert!(evaluate(&v, Money::new(dec!(100))).is_err());
    }

    #[test]
    fn pick_active_version_skips_expired() {
        let mut expired = version();
        expired.effective_until = Some(Utc::now() - Duration::hours(1));
        let mut current = version();
        current.version_id = "v2".into();
        let versions = vec![expired, current];
        let picked = pick_active_version(&versions, Utc::now()).unwrap();
        assert_eq!(picked.version_id, "v2");
    }
}
