use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    SamplePoint, Scenario, ScenarioEdit, ScenarioError, ScenarioField, ScenarioKey,
    ScenarioStore, ScenarioSummary, SliderRange, format_currency, max_exit_value,
    max_payout_value, try_compute_payout, try_sample,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliScenarioKey {
    FounderFriendly,
    VcFriendly,
    Balanced,
    Custom,
}

impl From<CliScenarioKey> for ScenarioKey {
    fn from(value: CliScenarioKey) -> Self {
        match value {
            CliScenarioKey::FounderFriendly => ScenarioKey::FounderFriendly,
            CliScenarioKey::VcFriendly => ScenarioKey::VcFriendly,
            CliScenarioKey::Balanced => ScenarioKey::Balanced,
            CliScenarioKey::Custom => ScenarioKey::Custom,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "liqpref",
    about = "Liquidation preference payout simulator (investor vs founder across exit values)"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the JSON HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print the sampled payout curve for a scenario
    Curve(ScenarioArgs),
    /// Print the payout split at a single exit value
    Payout {
        #[arg(long, help = "Exit value in money units, e.g. 50000000")]
        exit_value: f64,
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct ScenarioArgs {
    #[arg(
        long,
        value_enum,
        default_value_t = CliScenarioKey::Custom,
        help = "Preset to start from; field options below override it"
    )]
    scenario: CliScenarioKey,
    #[arg(long, help = "Invested capital, e.g. 10000000")]
    investment_amount: Option<f64>,
    #[arg(long, help = "Liquidation preference multiple, >= 1")]
    multiple: Option<f64>,
    #[arg(long, help = "Investor ownership in percent, 0 to 100")]
    ownership_percentage: Option<f64>,
    #[arg(
        long,
        value_name = "true|false",
        help = "Participating preferred; overrides the preset either way"
    )]
    participation: Option<bool>,
}

impl ScenarioArgs {
    fn resolve(&self) -> Result<(ScenarioKey, Scenario), ScenarioError> {
        let key = ScenarioKey::from(self.scenario);
        let overrides = ScenarioOverrides {
            investment_amount: self.investment_amount,
            multiple: self.multiple,
            ownership_percentage: self.ownership_percentage,
            has_participation: self.participation,
        };
        let scenario = overrides.apply(preset_or_default(key))?;
        Ok((key, scenario))
    }
}

/// Optional per-field replacements applied on top of a base scenario.
#[derive(Debug, Default, Clone, Copy)]
struct ScenarioOverrides {
    investment_amount: Option<f64>,
    multiple: Option<f64>,
    ownership_percentage: Option<f64>,
    has_participation: Option<bool>,
}

impl ScenarioOverrides {
    fn apply(self, base: Scenario) -> Result<Scenario, ScenarioError> {
        let edits = [
            self.investment_amount.map(ScenarioEdit::InvestmentAmount),
            self.multiple.map(ScenarioEdit::Multiple),
            self.ownership_percentage.map(ScenarioEdit::OwnershipPercentage),
            self.has_participation.map(ScenarioEdit::HasParticipation),
        ];
        let mut scenario = base;
        for edit in edits.into_iter().flatten() {
            scenario = scenario.with_edit(edit)?;
        }
        scenario.validate()?;
        Ok(scenario)
    }
}

/// Stateless entry points use the preset values, or the initial custom terms.
fn preset_or_default(key: ScenarioKey) -> Scenario {
    ScenarioStore::new().scenario(key)
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Serve { host, port } => run_http_server(SocketAddr::new(host, port)).await?,
        Command::Curve(args) => {
            let (key, scenario) = args.resolve()?;
            print_curve(key, &scenario)?;
        }
        Command::Payout {
            exit_value,
            scenario,
        } => {
            let (key, scenario) = scenario.resolve()?;
            let payout = try_compute_payout(exit_value, &scenario)?;
            println!(
                "{} at exit {}: investor {}, founder {}",
                key.display_name(),
                format_currency(exit_value),
                format_currency(payout.investor),
                format_currency(payout.founder)
            );
        }
    }
    Ok(())
}

fn print_curve(key: ScenarioKey, scenario: &Scenario) -> Result<(), ScenarioError> {
    let points = try_sample(scenario)?;
    let summary = ScenarioSummary::new(key, scenario);
    println!(
        "{}: investment {}, multiple {}, ownership {}, participation {}",
        summary.name,
        summary.investment_amount,
        summary.multiple,
        summary.ownership_percentage,
        summary.participation
    );
    println!("{:>12} {:>12} {:>12}", "exit", "investor", "founder");
    for point in &points {
        println!(
            "{:>12} {:>12} {:>12}",
            format_currency(point.exit_value),
            format_currency(point.investor_payout),
            format_currency(point.founder_payout)
        );
    }
    println!("max payout {}", format_currency(max_payout_value(&points)));
    Ok(())
}

pub type AppState = Arc<Mutex<ScenarioStore>>;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/scenarios", get(list_scenarios_handler))
        .route("/api/fields", get(fields_handler))
        .route("/api/scenario", get(current_scenario_handler))
        .route("/api/scenario/select", post(select_handler))
        .route("/api/scenario/custom", post(edit_custom_handler))
        .route("/api/curve", get(curve_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/payout", get(payout_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let state: AppState = Arc::new(Mutex::new(ScenarioStore::new()));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "liquidation preference API listening");

    axum::serve(listener, app(state)).await
}

// Edits replace the whole custom scenario, so a poisoned lock still guards a consistent value.
fn lock_store(state: &AppState) -> MutexGuard<'_, ScenarioStore> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Deserialize)]
struct SelectPayload {
    key: String,
}

#[derive(Debug, Deserialize)]
struct EditPayload {
    field: String,
    value: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    scenario: Option<String>,
    investment_amount: Option<f64>,
    multiple: Option<f64>,
    ownership_percentage: Option<f64>,
    has_participation: Option<bool>,
}

impl SimulatePayload {
    fn resolve(&self) -> Result<(ScenarioKey, Scenario), ScenarioError> {
        let key = match self.scenario.as_deref() {
            Some(raw) => raw.parse::<ScenarioKey>()?,
            None => ScenarioKey::Custom,
        };
        let overrides = ScenarioOverrides {
            investment_amount: self.investment_amount,
            multiple: self.multiple,
            ownership_percentage: self.ownership_percentage,
            has_participation: self.has_participation,
        };
        let scenario = overrides.apply(preset_or_default(key))?;
        Ok((key, scenario))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PayoutQuery {
    exit_value: Option<f64>,
    scenario: Option<String>,
    investment_amount: Option<f64>,
    multiple: Option<f64>,
    ownership_percentage: Option<f64>,
    has_participation: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioEntry {
    key: ScenarioKey,
    name: &'static str,
    scenario: Scenario,
    summary: ScenarioSummary,
}

#[derive(Debug, Serialize)]
struct FieldEntry {
    field: &'static str,
    slider: Option<SliderRange>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioResponse {
    active_key: ScenarioKey,
    scenario: Scenario,
    summary: ScenarioSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CurveResponse {
    scenario_key: ScenarioKey,
    scenario: Scenario,
    max_exit_value: f64,
    max_payout_value: f64,
    points: Vec<SamplePoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayoutResponse {
    scenario_key: ScenarioKey,
    exit_value: f64,
    investor_payout: f64,
    founder_payout: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn scenario_response(store: &ScenarioStore) -> ScenarioResponse {
    let key = store.active_key();
    let scenario = store.current();
    ScenarioResponse {
        active_key: key,
        scenario,
        summary: ScenarioSummary::new(key, &scenario),
    }
}

fn build_curve_response(
    key: ScenarioKey,
    scenario: &Scenario,
) -> Result<CurveResponse, ScenarioError> {
    let points = try_sample(scenario)?;
    Ok(CurveResponse {
        scenario_key: key,
        scenario: *scenario,
        max_exit_value: max_exit_value(scenario),
        max_payout_value: max_payout_value(&points),
        points,
    })
}

fn build_payout_response(query: &PayoutQuery) -> Result<PayoutResponse, ScenarioError> {
    let exit_value = query.exit_value.ok_or_else(|| ScenarioError::InvalidValue {
        field: "exitValue",
        reason: "is required".to_string(),
    })?;
    let payload = SimulatePayload {
        scenario: query.scenario.clone(),
        investment_amount: query.investment_amount,
        multiple: query.multiple,
        ownership_percentage: query.ownership_percentage,
        has_participation: query.has_participation,
    };
    let (key, scenario) = payload.resolve()?;
    let payout = try_compute_payout(exit_value, &scenario)?;
    Ok(PayoutResponse {
        scenario_key: key,
        exit_value,
        investor_payout: payout.investor,
        founder_payout: payout.founder,
    })
}

async fn list_scenarios_handler(State(state): State<AppState>) -> Response {
    let entries = lock_store(&state)
        .entries()
        .into_iter()
        .map(|(key, scenario)| ScenarioEntry {
            key,
            name: key.display_name(),
            scenario,
            summary: ScenarioSummary::new(key, &scenario),
        })
        .collect::<Vec<_>>();
    json_response(StatusCode::OK, entries)
}

fn field_entries() -> Vec<FieldEntry> {
    [
        ScenarioField::InvestmentAmount,
        ScenarioField::Multiple,
        ScenarioField::OwnershipPercentage,
        ScenarioField::HasParticipation,
    ]
    .into_iter()
    .map(|field| FieldEntry {
        field: field.as_str(),
        slider: field.slider_range(),
    })
    .collect()
}

async fn fields_handler() -> Response {
    json_response(StatusCode::OK, field_entries())
}

async fn current_scenario_handler(State(state): State<AppState>) -> Response {
    let response = scenario_response(&lock_store(&state));
    json_response(StatusCode::OK, response)
}

async fn select_handler(
    State(state): State<AppState>,
    Json(payload): Json<SelectPayload>,
) -> Response {
    let mut store = lock_store(&state);
    match store.select(&payload.key) {
        Ok(_) => json_response(StatusCode::OK, scenario_response(&store)),
        Err(err) => scenario_error_response(&err),
    }
}

async fn edit_custom_handler(
    State(state): State<AppState>,
    Json(payload): Json<EditPayload>,
) -> Response {
    let mut store = lock_store(&state);
    match store.edit_custom_field_json(&payload.field, &payload.value) {
        Ok(_) => json_response(StatusCode::OK, scenario_response(&store)),
        Err(err) => scenario_error_response(&err),
    }
}

async fn curve_handler(State(state): State<AppState>) -> Response {
    let (key, scenario) = {
        let store = lock_store(&state);
        (store.active_key(), store.current())
    };
    match build_curve_response(key, &scenario) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => scenario_error_response(&err),
    }
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let result = payload
        .resolve()
        .and_then(|(key, scenario)| build_curve_response(key, &scenario));
    match result {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => scenario_error_response(&err),
    }
}

async fn payout_handler(Query(query): Query<PayoutQuery>) -> Response {
    match build_payout_response(&query) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => scenario_error_response(&err),
    }
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn scenario_error_response(err: &ScenarioError) -> Response {
    warn!(error = %err, "rejected request");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
