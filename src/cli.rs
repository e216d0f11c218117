use std::net::{IpAddr, SocketAddr};

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::run_http_server;
use crate::core::{
    DEFAULT_HORIZONS, EngineError, GoalParams, RateProfile, RateSource, RiskTier,
    average_contribution, plan_goal, project_aggregate,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliRiskTier {
    Low,
    Medium,
    High,
}

impl From<CliRiskTier> for RiskTier {
    fn from(value: CliRiskTier) -> Self {
        match value {
            CliRiskTier::Low => RiskTier::Low,
            CliRiskTier::Medium => RiskTier::Medium,
            CliRiskTier::High => RiskTier::High,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "goalpath",
    about = "Savings goal planner: required monthly contribution, balance projection and milestones"
)]
pub struct Cli {
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Print the plan for one goal as JSON
    Plan(PlanArgs),
    /// Print the future-wealth projection for an average contribution as JSON
    Project(ProjectArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    #[arg(long, default_value_t = 0.4, help = "Monthly growth rate for the Low tier in percent")]
    pub low_rate: f64,
    #[arg(
        long,
        default_value_t = 0.8,
        help = "Monthly growth rate for the Medium tier in percent"
    )]
    pub medium_rate: f64,
    #[arg(long, default_value_t = 1.2, help = "Monthly growth rate for the High tier in percent")]
    pub high_rate: f64,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[arg(long, help = "Target value of the goal")]
    pub target: f64,
    #[arg(long, help = "Number of monthly periods to reach the goal")]
    pub horizon: u32,
    #[arg(long, default_value_t = 0.0)]
    pub current_balance: f64,
    #[arg(long, value_enum, default_value_t = CliRiskTier::Medium)]
    pub risk_tier: CliRiskTier,
    #[arg(
        long,
        help = "Monthly growth rate in percent; overrides --risk-tier when given"
    )]
    pub periodic_rate: Option<f64>,
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[arg(long, conflicts_with = "history")]
    pub average_contribution: Option<f64>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Past monthly contributions to average, comma separated"
    )]
    pub history: Vec<f64>,
    #[arg(long, default_value_t = 1.0, help = "Monthly growth rate in percent")]
    pub periodic_rate: f64,
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_HORIZONS)]
    pub horizons: Vec<u32>,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve(args) => {
            let rates = rate_profile(&args)?;
            let addr = SocketAddr::new(args.bind, args.port);
            run_http_server(addr, rates).await?;
        }
        Command::Plan(args) => {
            let plan = plan_goal(&goal_params(&args), &RateProfile::default())?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Project(args) => {
            let average = match args.average_contribution {
                Some(average) => average,
                None if !args.history.is_empty() => average_contribution(&args.history)?,
                None => {
                    return Err(CliError::Usage(
                        "either --average-contribution or --history is required".to_string(),
                    ));
                }
            };
            let points = project_aggregate(average, args.periodic_rate / 100.0, &args.horizons)?;
            println!("{}", serde_json::to_string_pretty(&points)?);
        }
    }
    Ok(())
}

fn rate_profile(args: &ServeArgs) -> Result<RateProfile, EngineError> {
    RateProfile::new(
        args.low_rate / 100.0,
        args.medium_rate / 100.0,
        args.high_rate / 100.0,
    )
}

fn goal_params(args: &PlanArgs) -> GoalParams {
    let rate = match args.periodic_rate {
        Some(pct) => RateSource::Periodic(pct / 100.0),
        None => RateSource::Tier(args.risk_tier.into()),
    };
    GoalParams {
        target_value: args.target,
        horizon_periods: args.horizon,
        current_balance: args.current_balance,
        rate,
    }
}
