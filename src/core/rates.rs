use serde::Serialize;

use super::error::EngineResult;
use super::types::{Instrument, RateSource, RiskTier};
use super::validate::validate_rate;

/// Monthly growth rate per risk tier.
///
/// Built once at startup and shared read-only; nothing mutates it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateProfile {
    low: f64,
    medium: f64,
    high: f64,
}

impl RateProfile {
    pub const DEFAULT: RateProfile = RateProfile {
        low: 0.004,
        medium: 0.008,
        high: 0.012,
    };

    pub fn new(low: f64, medium: f64, high: f64) -> EngineResult<Self> {
        Ok(Self {
            low: validate_rate("lowRate", low)?,
            medium: validate_rate("mediumRate", medium)?,
            high: validate_rate("highRate", high)?,
        })
    }

    pub fn rate_for(&self, tier: RiskTier) -> f64 {
        match tier {
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
        }
    }

    pub fn resolve(&self, source: RateSource) -> EngineResult<f64> {
        match source {
            RateSource::Tier(tier) => Ok(self.rate_for(tier)),
            RateSource::Periodic(rate) => validate_rate("periodicRate", rate),
        }
    }

    pub fn entries(&self) -> [(RiskTier, f64); 3] {
        RiskTier::ALL.map(|tier| (tier, self.rate_for(tier)))
    }
}

impl Default for RateProfile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub fn recommend_instrument(horizon_periods: u32) -> Instrument {
    match horizon_periods {
        0..=12 => Instrument::LiquidFund,
        13..=36 => Instrument::HybridConservativeFund,
        _ => Instrument::EquitySip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_orders_rates_by_tier() {
        let profile = RateProfile::default();
        assert_eq!(profile.rate_for(RiskTier::Low), 0.004);
        assert_eq!(profile.rate_for(RiskTier::Medium), 0.008);
        assert_eq!(profile.rate_for(RiskTier::High), 0.012);
        let entries = profile.entries();
        assert!(entries.windows(2).all(|w| w[0].1 < w[1].1));
    }

    #[test]
    fn new_rejects_negative_rate() {
        let err = RateProfile::new(0.004, -0.001, 0.012).expect_err("negative rate");
        assert_eq!(err.field(), "mediumRate");
    }

    #[test]
    fn direct_rate_is_validated() {
        let profile = RateProfile::default();
        assert_eq!(profile.resolve(RateSource::Periodic(0.02)), Ok(0.02));
        assert!(profile.resolve(RateSource::Periodic(f64::NAN)).is_err());
        assert_eq!(profile.resolve(RateSource::Tier(RiskTier::High)), Ok(0.012));
    }

    #[test]
    fn instrument_follows_horizon_bands() {
        assert_eq!(recommend_instrument(6), Instrument::LiquidFund);
        assert_eq!(recommend_instrument(12), Instrument::LiquidFund);
        assert_eq!(recommend_instrument(13), Instrument::HybridConservativeFund);
        assert_eq!(recommend_instrument(36), Instrument::HybridConservativeFund);
        assert_eq!(recommend_instrument(120), Instrument::EquitySip);
    }
}
