mod aggregate;
mod engine;
mod error;
mod rates;
mod solver;
mod types;
mod validate;

pub use aggregate::{DEFAULT_DASHBOARD_RATE, DEFAULT_HORIZONS, average_contribution, project_aggregate};
pub use engine::{MILESTONE_FRACTIONS, plan_goal, simulate_balance, track_milestones};
pub use error::{EngineError, EngineResult};
pub use rates::{RateProfile, recommend_instrument};
pub use solver::{future_value_of_balance, solve_contribution};
pub use types::{
    AggregatePoint, GoalParams, GoalPlan, Instrument, MilestoneRecord, ProjectionRow, RateSource,
    RiskTier,
};
pub use validate::{MAX_HORIZON_PERIODS, MAX_PERIODIC_RATE, horizon_from_number};
