use super::error::{EngineError, EngineResult};
use super::validate::{validate_amount, validate_horizon, validate_rate, validate_target};

/// `(1 + rate)^periods`, computed through `ln_1p` to stay accurate for tiny rates.
pub(crate) fn growth_factor(rate: f64, periods: u32) -> f64 {
    (periods as f64 * rate.ln_1p()).exp()
}

/// `(1 + rate)^periods - 1` without the cancellation of subtracting one.
pub(crate) fn growth_minus_one(rate: f64, periods: u32) -> f64 {
    (periods as f64 * rate.ln_1p()).exp_m1()
}

/// Value the existing balance reaches on its own after `horizon_periods`.
pub fn future_value_of_balance(current_balance: f64, horizon_periods: u32, periodic_rate: f64) -> f64 {
    current_balance * growth_factor(periodic_rate, horizon_periods)
}

/// One period of the contribute-then-grow recurrence.
pub(crate) fn advance(balance: f64, contribution: f64, growth: f64) -> f64 {
    (balance + contribution) * growth
}

fn final_balance(contribution: f64, current_balance: f64, horizon_periods: u32, periodic_rate: f64) -> f64 {
    let growth = 1.0 + periodic_rate;
    (0..horizon_periods).fold(current_balance, |balance, _| advance(balance, contribution, growth))
}

/// Accumulated value of one unit contributed at the start of each period.
fn annuity_due_factor(periodic_rate: f64, horizon_periods: u32) -> f64 {
    if periodic_rate == 0.0 {
        horizon_periods as f64
    } else {
        growth_minus_one(periodic_rate, horizon_periods) / periodic_rate * (1.0 + periodic_rate)
    }
}

// Smallest f64 above a non-negative finite value.
fn next_up(value: f64) -> f64 {
    f64::from_bits(value.to_bits() + 1)
}

const MAX_REFINEMENTS: usize = 64;

/// Constant per-period contribution that closes the gap between the grown
/// current balance and `target_value` exactly at the horizon.
///
/// Contributions are added at the start of each period and then grow with
/// that period's rate, matching [`simulate_balance`](super::simulate_balance).
/// The closed-form result is nudged upwards until the period-by-period
/// balance is at least the target, so round-off never leaves a solved plan
/// short of its goal. A goal already covered by the existing balance
/// yields `0.0`.
pub fn solve_contribution(
    target_value: f64,
    current_balance: f64,
    horizon_periods: u32,
    periodic_rate: f64,
) -> EngineResult<f64> {
    let target_value = validate_target("targetValue", target_value)?;
    let current_balance = validate_amount("currentBalance", current_balance)?;
    let horizon_periods = validate_horizon("horizonPeriods", horizon_periods)?;
    let periodic_rate = validate_rate("periodicRate", periodic_rate)?;

    let grown_balance = future_value_of_balance(current_balance, horizon_periods, periodic_rate);
    let factor = annuity_due_factor(periodic_rate, horizon_periods);
    if !grown_balance.is_finite() || !factor.is_finite() {
        return Err(EngineError::rate(
            "periodicRate",
            format!("growth at rate {periodic_rate} overflows over {horizon_periods} periods"),
        ));
    }

    if final_balance(0.0, current_balance, horizon_periods, periodic_rate) >= target_value {
        return Ok(0.0);
    }

    let mut contribution = (target_value - grown_balance).max(0.0) / factor;
    for _ in 0..MAX_REFINEMENTS {
        let shortfall =
            target_value - final_balance(contribution, current_balance, horizon_periods, periodic_rate);
        if shortfall <= 0.0 {
            break;
        }
        contribution = next_up(contribution + shortfall / factor);
    }
    Ok(contribution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn zero_rate_divides_gap_evenly() {
        let contribution = solve_contribution(1_200.0, 0.0, 12, 0.0).expect("must solve");
        assert_eq!(contribution, 100.0);
    }

    #[test]
    fn zero_rate_accounts_for_existing_balance() {
        let contribution = solve_contribution(1_200.0, 600.0, 12, 0.0).expect("must solve");
        assert_eq!(contribution, 50.0);
    }

    #[test]
    fn goal_already_met_by_growth_needs_no_contribution() {
        let contribution = solve_contribution(1_000.0, 2_000.0, 12, 0.01).expect("must solve");
        assert_eq!(contribution, 0.0);
    }

    #[test]
    fn balance_that_grows_exactly_to_target_needs_no_contribution() {
        let contribution = solve_contribution(1_000.0, 1_000.0, 24, 0.0).expect("must solve");
        assert_eq!(contribution, 0.0);
    }

    #[test]
    fn single_period_contribution_grows_once() {
        let contribution = solve_contribution(1_010.0, 0.0, 1, 0.01).expect("must solve");
        assert_close(contribution, 1_000.0, 1e-9);
    }

    #[test]
    fn matches_annuity_due_closed_form() {
        let target: f64 = 120_000.0;
        let rate: f64 = 0.008;
        let n = 12;
        let expected = target * rate / ((1.0 + rate).powi(n) - 1.0) / (1.0 + rate);
        let contribution = solve_contribution(target, 0.0, n as u32, rate).expect("must solve");
        assert_close(contribution, expected, 1e-6);
    }

    #[test]
    fn future_value_of_balance_compounds() {
        assert_close(future_value_of_balance(1_000.0, 2, 0.1), 1_210.0, 1e-9);
        assert_eq!(future_value_of_balance(1_000.0, 12, 0.0), 1_000.0);
    }

    #[test]
    fn rejects_invalid_inputs_with_field_names() {
        let err = solve_contribution(-1.0, 0.0, 12, 0.01).expect_err("negative target");
        assert!(matches!(err, EngineError::InvalidAmount { field: "targetValue", .. }));

        let err = solve_contribution(1_000.0, -5.0, 12, 0.01).expect_err("negative balance");
        assert!(matches!(err, EngineError::InvalidAmount { field: "currentBalance", .. }));

        let err = solve_contribution(1_000.0, 0.0, 0, 0.01).expect_err("zero horizon");
        assert!(matches!(err, EngineError::InvalidHorizon { field: "horizonPeriods", .. }));

        let err = solve_contribution(1_000.0, 0.0, 12, -0.01).expect_err("negative rate");
        assert!(matches!(err, EngineError::InvalidRate { field: "periodicRate", .. }));

        let err = solve_contribution(f64::NAN, 0.0, 12, 0.01).expect_err("nan target");
        assert_eq!(err.field(), "targetValue");
    }

    #[test]
    fn rejects_growth_that_overflows() {
        let err = solve_contribution(1_000.0, 0.0, 1_100, 1.0).expect_err("overflowing growth");
        assert!(matches!(err, EngineError::InvalidRate { field: "periodicRate", .. }));

        let err = solve_contribution(1_000.0, 5.0, 1_200, 1.0).expect_err("overflowing balance");
        assert_eq!(err.field(), "periodicRate");
    }

    #[test]
    fn solved_contribution_never_falls_short() {
        for (target, current, n, rate) in [
            (120_000.0, 0.0, 12, 0.008),
            (1_000_000.0, 12_345.67, 360, 0.012),
            (999_999.99, 0.0, 1_200, 0.004),
            (3.0, 0.0, 7, 0.0),
            (0.1, 0.0, 3, 0.0),
        ] {
            let contribution = solve_contribution(target, current, n, rate).expect("must solve");
            let reached = final_balance(contribution, current, n, rate);
            assert!(reached >= target, "target {target} reached {reached}");
            assert_close(reached, target, target * 1e-9);
        }
    }
}
