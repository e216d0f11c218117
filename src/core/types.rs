use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::EngineError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskTier::Low),
            "medium" => Ok(RiskTier::Medium),
            "high" => Ok(RiskTier::High),
            _ => Err(EngineError::InvalidTier(s.to_string())),
        }
    }
}

/// Where a goal's periodic rate comes from.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum RateSource {
    Tier(RiskTier),
    Periodic(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalParams {
    pub target_value: f64,
    pub horizon_periods: u32,
    pub current_balance: f64,
    pub rate: RateSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRow {
    pub period_index: u32,
    pub contribution: f64,
    pub balance_after_period: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRecord {
    pub fraction_of_target: f64,
    /// `None` when the simulated balance never reaches the threshold.
    pub period_reached: Option<u32>,
    pub balance_at_that_point: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Instrument {
    LiquidFund,
    HybridConservativeFund,
    EquitySip,
}

impl Instrument {
    /// Human-readable name shown next to the plan.
    pub fn label(self) -> &'static str {
        match self {
            Instrument::LiquidFund => "Liquid / Short Duration Funds",
            Instrument::HybridConservativeFund => "Hybrid Conservative Funds",
            Instrument::EquitySip => "Equity SIP (Large/Mid Cap)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPlan {
    pub periodic_rate: f64,
    pub contribution: f64,
    pub contribution_rounded: f64,
    pub projected_balance: f64,
    pub progress_percent: f64,
    pub recommended_instrument: Instrument,
    pub instrument_label: String,
    pub projection: Vec<ProjectionRow>,
    pub milestones: Vec<MilestoneRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatePoint {
    pub horizon_periods: u32,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_tier_parses_case_insensitively() {
        assert_eq!("low".parse::<RiskTier>(), Ok(RiskTier::Low));
        assert_eq!(" Medium ".parse::<RiskTier>(), Ok(RiskTier::Medium));
        assert_eq!("HIGH".parse::<RiskTier>(), Ok(RiskTier::High));
    }

    #[test]
    fn unknown_tier_is_rejected() {
        let err = "aggressive".parse::<RiskTier>().expect_err("unknown tier");
        assert_eq!(err, EngineError::InvalidTier("aggressive".to_string()));
        assert_eq!(err.field(), "riskTier");
    }

    #[test]
    fn milestone_serializes_unreached_as_null() {
        let record = MilestoneRecord {
            fraction_of_target: 1.0,
            period_reached: None,
            balance_at_that_point: 10.0,
        };
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(json.contains("\"periodReached\":null"));
        assert!(json.contains("\"balanceAtThatPoint\""));
    }
}
