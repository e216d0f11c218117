use super::error::{EngineError, EngineResult};
use super::solver::growth_minus_one;
use super::types::AggregatePoint;
use super::validate::{validate_amount, validate_horizon, validate_rate};

pub const DEFAULT_DASHBOARD_RATE: f64 = 0.01;
pub const DEFAULT_HORIZONS: [u32; 5] = [12, 24, 36, 60, 120];

/// Mean of past periodic contributions; an empty history averages to zero.
pub fn average_contribution(history: &[f64]) -> EngineResult<f64> {
    if history.is_empty() {
        return Ok(0.0);
    }
    let mut total = 0.0;
    for &amount in history {
        total += validate_amount("history", amount)?;
    }
    Ok(total / history.len() as f64)
}

/// Future value of an ordinary annuity at each horizon.
///
/// Horizons are treated as a set: they come back sorted ascending with
/// duplicates removed. Only the terminal value per horizon is computed.
pub fn project_aggregate(
    average_contribution: f64,
    periodic_rate: f64,
    horizons: &[u32],
) -> EngineResult<Vec<AggregatePoint>> {
    let average_contribution = validate_amount("averageContribution", average_contribution)?;
    let periodic_rate = validate_rate("periodicRate", periodic_rate)?;
    if horizons.is_empty() {
        return Err(EngineError::horizon("horizons", "must contain at least one horizon"));
    }

    let mut horizons = horizons.to_vec();
    for &periods in &horizons {
        validate_horizon("horizons", periods)?;
    }
    horizons.sort_unstable();
    horizons.dedup();

    Ok(horizons
        .into_iter()
        .map(|periods| AggregatePoint {
            horizon_periods: periods,
            value: annuity_future_value(average_contribution, periodic_rate, periods),
        })
        .collect())
}

fn annuity_future_value(contribution: f64, rate: f64, periods: u32) -> f64 {
    if rate == 0.0 {
        return contribution * periods as f64;
    }
    contribution * growth_minus_one(rate, periods) / rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn zero_contribution_projects_zero() {
        let points = project_aggregate(0.0, 0.01, &[12]).expect("valid inputs");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].horizon_periods, 12);
        assert_eq!(points[0].value, 0.0);
    }

    #[test]
    fn zero_rate_is_linear() {
        let points = project_aggregate(500.0, 0.0, &DEFAULT_HORIZONS).expect("valid inputs");
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![6_000.0, 12_000.0, 18_000.0, 30_000.0, 60_000.0]);
    }

    #[test]
    fn matches_closed_form_at_one_percent() {
        let points = project_aggregate(1_000.0, 0.01, &[12]).expect("valid inputs");
        let expected = 1_000.0 * (1.01f64.powi(12) - 1.0) / 0.01;
        assert_close(points[0].value, expected, 1e-6);
    }

    #[test]
    fn horizons_are_sorted_and_deduplicated() {
        let points = project_aggregate(100.0, 0.01, &[60, 12, 60, 24]).expect("valid inputs");
        let horizons: Vec<u32> = points.iter().map(|p| p.horizon_periods).collect();
        assert_eq!(horizons, vec![12, 24, 60]);
    }

    #[test]
    fn rejects_empty_horizons_and_negative_average() {
        let err = project_aggregate(100.0, 0.01, &[]).expect_err("empty horizons");
        assert_eq!(err.field(), "horizons");
        let err = project_aggregate(-1.0, 0.01, &[12]).expect_err("negative average");
        assert_eq!(err.field(), "averageContribution");
        let err = project_aggregate(100.0, 0.01, &[0, 12]).expect_err("zero horizon");
        assert_eq!(err.field(), "horizons");
    }

    #[test]
    fn average_of_history() {
        assert_eq!(average_contribution(&[]), Ok(0.0));
        assert_eq!(average_contribution(&[1_000.0, 2_000.0, 3_000.0]), Ok(2_000.0));
        assert!(average_contribution(&[1_000.0, -5.0]).is_err());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_closed_form_matches_end_of_period_accumulation(
            contribution in 0u32..100_000,
            horizon in 1u32..240,
            rate_bp in 0u32..200,
        ) {
            let contribution = contribution as f64;
            let rate = rate_bp as f64 / 10_000.0;
            let points = project_aggregate(contribution, rate, &[horizon]).expect("valid inputs");

            let mut balance = 0.0_f64;
            for _ in 0..horizon {
                balance = balance * (1.0 + rate) + contribution;
            }
            let tol = balance.abs() * 1e-9 + 1e-9;
            prop_assert!((points[0].value - balance).abs() <= tol, "closed {} loop {}", points[0].value, balance);
        }
    }
}
