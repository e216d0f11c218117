mod error;
pub mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

pub use error::{ApiError, ApiResult};
use store::{GoalStore, InMemoryGoalStore, NewGoal, StoredGoal};

use crate::core::{
    AggregatePoint, DEFAULT_DASHBOARD_RATE, DEFAULT_HORIZONS, GoalParams, GoalPlan, RateProfile,
    RateSource, RiskTier, average_contribution, horizon_from_number, plan_goal, project_aggregate,
};

#[derive(Clone)]
pub struct AppState {
    rates: RateProfile,
    goals: Arc<dyn GoalStore>,
}

impl AppState {
    pub fn new(rates: RateProfile, goals: Arc<dyn GoalStore>) -> Self {
        Self { rates, goals }
    }

    pub fn in_memory(rates: RateProfile) -> Self {
        Self::new(rates, Arc::new(InMemoryGoalStore::default()))
    }
}

/// Goal inputs as sent by the web client. Keys used by the goal wizard
/// front end (`target`, `months`, `currentSaved`, `risk`) are accepted too.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    #[serde(alias = "target")]
    target_value: Option<f64>,
    #[serde(alias = "months")]
    horizon_periods: Option<f64>,
    #[serde(alias = "currentSaved")]
    current_balance: Option<f64>,
    #[serde(alias = "risk")]
    risk_tier: Option<String>,
    periodic_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalPayload {
    name: Option<String>,
    #[serde(flatten)]
    plan: PlanPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    average_contribution: Option<f64>,
    history: Option<Vec<f64>>,
    periodic_rate: Option<f64>,
    horizons: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    params: GoalParams,
    plan: GoalPlan,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    average_contribution: f64,
    periodic_rate: f64,
    points: Vec<AggregatePoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TierRate {
    tier: RiskTier,
    periodic_rate: f64,
}

#[derive(Debug, Serialize)]
struct RatesResponse {
    tiers: Vec<TierRate>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/plan", get(plan_get_handler).post(plan_post_handler))
        .route("/api/projections", post(projection_handler))
        .route("/api/rates", get(rates_handler))
        .route("/api/goals", get(list_goals_handler).post(create_goal_handler))
        .route(
            "/api/goals/:id",
            get(get_goal_handler)
                .put(update_goal_handler)
                .delete(delete_goal_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_http_server(addr: SocketAddr, rates: RateProfile) -> std::io::Result<()> {
    let app = router(AppState::in_memory(rates));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "goal planner HTTP API listening");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn plan_get_handler(
    State(state): State<AppState>,
    payload: Result<Query<PlanPayload>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(payload) = payload?;
    plan_handler_impl(&state, payload)
}

async fn plan_post_handler(
    State(state): State<AppState>,
    payload: Result<Json<PlanPayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    plan_handler_impl(&state, payload)
}

fn plan_handler_impl(state: &AppState, payload: PlanPayload) -> ApiResult<Response> {
    let params = goal_params_from_payload(payload)?;
    let plan = plan_goal(&params, &state.rates)?;
    Ok(json_response(StatusCode::OK, PlanResponse { params, plan }))
}

async fn projection_handler(
    payload: Result<Json<ProjectionPayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    let average_contribution = match (payload.average_contribution, payload.history) {
        (Some(average), _) => average,
        (None, Some(history)) => average_contribution(&history)?,
        (None, None) => return Err(ApiError::MissingField("averageContribution")),
    };
    let periodic_rate = payload.periodic_rate.unwrap_or(DEFAULT_DASHBOARD_RATE);
    let horizons = match payload.horizons {
        Some(values) => values
            .into_iter()
            .map(|value| horizon_from_number("horizons", value))
            .collect::<Result<Vec<u32>, _>>()?,
        None => DEFAULT_HORIZONS.to_vec(),
    };

    let points = project_aggregate(average_contribution, periodic_rate, &horizons)?;
    Ok(json_response(
        StatusCode::OK,
        ProjectionResponse {
            average_contribution,
            periodic_rate,
            points,
        },
    ))
}

async fn rates_handler(State(state): State<AppState>) -> Response {
    let tiers = state
        .rates
        .entries()
        .into_iter()
        .map(|(tier, periodic_rate)| TierRate {
            tier,
            periodic_rate,
        })
        .collect();
    json_response(StatusCode::OK, RatesResponse { tiers })
}

async fn list_goals_handler(State(state): State<AppState>) -> ApiResult<Response> {
    let goals = state.goals.list()?;
    Ok(json_response(StatusCode::OK, goals))
}

async fn get_goal_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Response> {
    let Path(id) = id?;
    let goal = state.goals.get(id)?;
    Ok(json_response(StatusCode::OK, goal))
}

async fn create_goal_handler(
    State(state): State<AppState>,
    payload: Result<Json<GoalPayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    let goal = new_goal_from_payload(&state, payload)?;
    let stored = state.goals.insert(goal)?;
    log_goal_saved("created", &stored);
    Ok(json_response(StatusCode::CREATED, stored))
}

async fn update_goal_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<GoalPayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let goal = new_goal_from_payload(&state, payload)?;
    let stored = state.goals.update(id, goal)?;
    log_goal_saved("updated", &stored);
    Ok(json_response(StatusCode::OK, stored))
}

async fn delete_goal_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Response> {
    let Path(id) = id?;
    state.goals.delete(id)?;
    info!(%id, "goal deleted");
    Ok(json_response(
        StatusCode::OK,
        MessageResponse {
            message: "Goal deleted".to_string(),
        },
    ))
}

fn log_goal_saved(action: &str, goal: &StoredGoal) {
    info!(
        id = %goal.id,
        action,
        contribution = goal.plan.contribution,
        "goal saved"
    );
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            field: None,
        },
    )
}

#[cfg(test)]
fn goal_params_from_json(json: &str) -> ApiResult<GoalParams> {
    let payload = serde_json::from_str::<PlanPayload>(json).expect("payload JSON should parse");
    goal_params_from_payload(payload)
}

fn goal_params_from_payload(payload: PlanPayload) -> ApiResult<GoalParams> {
    let target_value = payload
        .target_value
        .ok_or(ApiError::MissingField("targetValue"))?;
    let horizon_periods = payload
        .horizon_periods
        .ok_or(ApiError::MissingField("horizonPeriods"))?;
    let horizon_periods = horizon_from_number("horizonPeriods", horizon_periods)?;

    let rate = match (payload.periodic_rate, payload.risk_tier) {
        (Some(rate), _) => RateSource::Periodic(rate),
        (None, Some(tier)) => RateSource::Tier(tier.parse()?),
        (None, None) => RateSource::Tier(RiskTier::Medium),
    };

    Ok(GoalParams {
        target_value,
        horizon_periods,
        current_balance: payload.current_balance.unwrap_or(0.0),
        rate,
    })
}

fn new_goal_from_payload(state: &AppState, payload: GoalPayload) -> ApiResult<NewGoal> {
    let name = payload
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or(ApiError::MissingField("name"))?;
    let params = goal_params_from_payload(payload.plan)?;
    let plan = plan_goal(&params, &state.rates)?;
    Ok(NewGoal { name, params, plan })
}
