use tracing::debug;

use super::error::EngineResult;
use super::rates::{RateProfile, recommend_instrument};
use super::solver::{advance, solve_contribution};
use super::types::{GoalParams, GoalPlan, MilestoneRecord, ProjectionRow};
use super::validate::{validate_amount, validate_horizon, validate_rate, validate_target};

pub const MILESTONE_FRACTIONS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];

/// Period-by-period balance under a constant contribution.
///
/// Each period adds the contribution first and then applies growth:
/// `balance = (balance + contribution) * (1 + rate)`. Rows are numbered
/// from 1 and returned in period order.
pub fn simulate_balance(
    contribution: f64,
    current_balance: f64,
    horizon_periods: u32,
    periodic_rate: f64,
) -> EngineResult<Vec<ProjectionRow>> {
    let contribution = validate_amount("contribution", contribution)?;
    let current_balance = validate_amount("currentBalance", current_balance)?;
    let horizon_periods = validate_horizon("horizonPeriods", horizon_periods)?;
    let periodic_rate = validate_rate("periodicRate", periodic_rate)?;

    let growth = 1.0 + periodic_rate;
    let mut balance = current_balance;
    let mut rows = Vec::with_capacity(horizon_periods as usize);
    for period_index in 1..=horizon_periods {
        balance = advance(balance, contribution, growth);
        rows.push(ProjectionRow {
            period_index,
            contribution,
            balance_after_period: balance,
        });
    }
    Ok(rows)
}

/// First period at which the balance reaches 25/50/75/100% of the target.
///
/// Unreached milestones report the last simulated balance, or
/// `starting_balance` when there are no rows.
pub fn track_milestones(
    target_value: f64,
    starting_balance: f64,
    rows: &[ProjectionRow],
) -> EngineResult<Vec<MilestoneRecord>> {
    let target_value = validate_target("targetValue", target_value)?;
    let starting_balance = validate_amount("currentBalance", starting_balance)?;
    let final_balance = rows
        .last()
        .map(|row| row.balance_after_period)
        .unwrap_or(starting_balance);

    Ok(MILESTONE_FRACTIONS
        .iter()
        .map(|&fraction| {
            let threshold = target_value * fraction;
            match rows.iter().find(|row| row.balance_after_period >= threshold) {
                Some(row) => MilestoneRecord {
                    fraction_of_target: fraction,
                    period_reached: Some(row.period_index),
                    balance_at_that_point: row.balance_after_period,
                },
                None => MilestoneRecord {
                    fraction_of_target: fraction,
                    period_reached: None,
                    balance_at_that_point: final_balance,
                },
            }
        })
        .collect())
}

/// Runs rate lookup, contribution solving, simulation and milestone
/// tracking for one goal. Either every part of the plan is produced or
/// the first validation error is returned.
pub fn plan_goal(params: &GoalParams, profile: &RateProfile) -> EngineResult<GoalPlan> {
    let periodic_rate = profile.resolve(params.rate)?;
    let contribution = solve_contribution(
        params.target_value,
        params.current_balance,
        params.horizon_periods,
        periodic_rate,
    )?;
    let projection = simulate_balance(
        contribution,
        params.current_balance,
        params.horizon_periods,
        periodic_rate,
    )?;
    let milestones = track_milestones(params.target_value, params.current_balance, &projection)?;

    let projected_balance = projection
        .last()
        .map(|row| row.balance_after_period)
        .unwrap_or(params.current_balance);
    let progress_percent = (params.current_balance / params.target_value * 100.0).min(100.0);
    let recommended_instrument = recommend_instrument(params.horizon_periods);

    debug!(
        horizon = params.horizon_periods,
        periodic_rate,
        contribution,
        projected_balance,
        "goal plan computed"
    );

    Ok(GoalPlan {
        periodic_rate,
        contribution,
        contribution_rounded: contribution.ceil(),
        projected_balance,
        progress_percent,
        recommended_instrument,
        instrument_label: recommended_instrument.label().to_string(),
        projection,
        milestones,
    })
}
