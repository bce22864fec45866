use anyhow::Context;
use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{Contribution, PlanInputs};
use crate::report::{SavingsReport, render_svg_chart, render_text};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Parser, Debug)]
#[command(
    name = "taxsave",
    about = "Estimate employee and employer tax savings from pre-tax savings plans (401(k)/HSA or FSA)"
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rate-based plan: each participant contributes a percentage of income
    Rate(RateArgs),
    /// Fixed-amount plan: each participant contributes a flat FSA amount
    Fixed(FixedArgs),
    /// Serve the calculator page and JSON API over HTTP
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
    employees: i64,
    #[arg(long, default_value_t = 50_000.0, help = "Average annual income in dollars")]
    avg_income: f64,
    #[arg(
        long,
        default_value_t = 50.0,
        help = "Share of employees enrolled in the plan, in percent (0-100)"
    )]
    participation_rate: f64,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[arg(long, help = "Also write the savings sweep chart to this SVG file")]
    chart: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RateArgs {
    #[command(flatten)]
    plan: PlanArgs,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Pre-tax contribution as percent of income (0-15)"
    )]
    contribution_rate: f64,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct FixedArgs {
    #[command(flatten)]
    plan: PlanArgs,
    #[arg(
        long,
        default_value_t = 3_000.0,
        help = "FSA contribution per participating employee in dollars"
    )]
    contribution_amount: f64,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum CliContribution {
    RatePercent(f64),
    Amount(f64),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPlan {
    #[serde(alias = "rate-based", alias = "rateBased", alias = "401k", alias = "hsa")]
    Rate,
    #[serde(alias = "fixed-amount", alias = "fixedAmount", alias = "fsa")]
    Fixed,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SavingsPayload {
    plan: Option<ApiPlan>,
    employees: Option<i64>,
    avg_income: Option<f64>,
    participation_rate: Option<f64>,
    contribution_rate: Option<f64>,
    contribution_amount: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidInput(msg) => {
                warn!(error = %msg, "rejected savings request");
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
        };
        json_response(
            status,
            ErrorResponse {
                error: self.to_string(),
            },
        )
    }
}

/// How each input is spelled to the caller in validation messages.
struct FieldNames {
    employees: &'static str,
    avg_income: &'static str,
    participation_rate: &'static str,
    contribution_rate: &'static str,
    contribution_amount: &'static str,
}

const CLI_FIELDS: FieldNames = FieldNames {
    employees: "--employees",
    avg_income: "--avg-income",
    participation_rate: "--participation-rate",
    contribution_rate: "--contribution-rate",
    contribution_amount: "--contribution-amount",
};

const API_FIELDS: FieldNames = FieldNames {
    employees: "employees",
    avg_income: "avgIncome",
    participation_rate: "participationRate",
    contribution_rate: "contributionRate",
    contribution_amount: "contributionAmount",
};

fn build_inputs(plan: &PlanArgs, contribution: CliContribution) -> Result<PlanInputs, String> {
    validate_inputs(plan, contribution, &CLI_FIELDS)
}

fn validate_inputs(
    plan: &PlanArgs,
    contribution: CliContribution,
    names: &FieldNames,
) -> Result<PlanInputs, String> {
    if plan.employees < 0 {
        return Err(format!("{} must be >= 0", names.employees));
    }
    let employee_count = u32::try_from(plan.employees)
        .map_err(|_| format!("{} must be <= {}", names.employees, u32::MAX))?;

    if !plan.avg_income.is_finite() || plan.avg_income < 0.0 {
        return Err(format!("{} must be >= 0", names.avg_income));
    }

    if !(0.0..=100.0).contains(&plan.participation_rate) {
        return Err(format!(
            "{} must be between 0 and 100",
            names.participation_rate
        ));
    }

    let contribution = match contribution {
        CliContribution::RatePercent(rate) => {
            if !(0.0..=15.0).contains(&rate) {
                return Err(format!(
                    "{} must be between 0 and 15",
                    names.contribution_rate
                ));
            }
            Contribution::Rate(rate / 100.0)
        }
        CliContribution::Amount(amount) => {
            if !amount.is_finite() || amount < 0.0 {
                return Err(format!("{} must be >= 0", names.contribution_amount));
            }
            Contribution::Amount(amount)
        }
    };

    PlanInputs::new(
        employee_count,
        plan.avg_income,
        plan.participation_rate / 100.0,
        contribution,
    )
    .map_err(|e| e.to_string())
}

fn default_plan_args() -> PlanArgs {
    PlanArgs {
        employees: 100,
        avg_income: 50_000.0,
        participation_rate: 50.0,
    }
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<PlanInputs, String> {
    let payload = serde_json::from_str::<SavingsPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SavingsPayload) -> Result<PlanInputs, String> {
    let mut plan = default_plan_args();

    if let Some(v) = payload.employees {
        plan.employees = v;
    }
    if let Some(v) = payload.avg_income {
        plan.avg_income = v;
    }
    if let Some(v) = payload.participation_rate {
        plan.participation_rate = v;
    }

    let contribution = match payload.plan.unwrap_or(ApiPlan::Rate) {
        ApiPlan::Rate => CliContribution::RatePercent(payload.contribution_rate.unwrap_or(5.0)),
        ApiPlan::Fixed => CliContribution::Amount(payload.contribution_amount.unwrap_or(3_000.0)),
    };

    validate_inputs(&plan, contribution, &API_FIELDS)
}

fn render_output(report: &SavingsReport, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(report)?)),
    }
}

fn run_plan(
    plan: &PlanArgs,
    contribution: CliContribution,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let inputs = build_inputs(plan, contribution).map_err(anyhow::Error::msg)?;
    let report = SavingsReport::build(&inputs);

    if let Some(path) = &output.chart {
        let svg = render_svg_chart(report.plan, &report.sweep);
        std::fs::write(path, svg)
            .with_context(|| format!("failed to write chart to {}", path.display()))?;
        info!(path = %path.display(), "wrote savings chart");
    }

    print!("{}", render_output(&report, output.format)?);
    Ok(())
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Rate(args) => run_plan(
            &args.plan,
            CliContribution::RatePercent(args.contribution_rate),
            &args.output,
        ),
        Command::Fixed(args) => run_plan(
            &args.plan,
            CliContribution::Amount(args.contribution_amount),
            &args.output,
        ),
        Command::Serve { port } => run_http_server(port).await.context("HTTP server failed"),
    }
}

fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/savings",
            get(savings_get_handler).post(savings_post_handler),
        )
        .route(
            "/api/chart.svg",
            get(chart_get_handler).post(chart_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("tax savings HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router()).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    ApiError::NotFound.into_response()
}

async fn savings_get_handler(payload: Result<Query<SavingsPayload>, QueryRejection>) -> Response {
    savings_handler_impl(payload.map(|Query(p)| p).map_err(ApiError::from))
}

async fn savings_post_handler(payload: Result<Json<SavingsPayload>, JsonRejection>) -> Response {
    savings_handler_impl(payload.map(|Json(p)| p).map_err(ApiError::from))
}

async fn chart_get_handler(payload: Result<Query<SavingsPayload>, QueryRejection>) -> Response {
    chart_handler_impl(payload.map(|Query(p)| p).map_err(ApiError::from))
}

async fn chart_post_handler(payload: Result<Json<SavingsPayload>, JsonRejection>) -> Response {
    chart_handler_impl(payload.map(|Json(p)| p).map_err(ApiError::from))
}

// Extractor rejections arrive here as `ApiError` so every failure shares the
// JSON error body.
fn report_from_payload(
    payload: Result<SavingsPayload, ApiError>,
) -> Result<SavingsReport, ApiError> {
    let inputs = api_request_from_payload(payload?).map_err(ApiError::InvalidInput)?;
    Ok(SavingsReport::build(&inputs))
}

fn savings_handler_impl(payload: Result<SavingsPayload, ApiError>) -> Response {
    match report_from_payload(payload) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(err) => err.into_response(),
    }
}

fn chart_handler_impl(payload: Result<SavingsPayload, ApiError>) -> Response {
    match report_from_payload(payload) {
        Ok(report) => with_cache_control((
            [(header::CONTENT_TYPE, "image/svg+xml")],
            render_svg_chart(report.plan, &report.sweep),
        )),
        Err(err) => err.into_response(),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}
