//! Handlers for gateway instances: listing, connection status and number
//! checks. These are thin proxies over [`GatewayApi`](bulkline_gateway::GatewayApi).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use bulkline_gateway::messages::{InstanceInfo, NumberCheck};
use bulkline_gateway::status::build_report;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /instances/{name}/check-numbers`.
#[derive(Debug, Deserialize)]
pub struct CheckNumbersInput {
    pub numbers: Vec<String>,
}

/// Result for one requested number.
#[derive(Debug, Serialize)]
pub struct NumberCheckResult {
    pub number: String,
    pub valid: bool,
    pub jid: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NumberCheckSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

#[derive(Debug, Serialize)]
pub struct NumberCheckResponse {
    pub results: Vec<NumberCheckResult>,
    pub summary: NumberCheckSummary,
}

/// GET /api/v1/instances
pub async fn list_instances(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let instances: Vec<InstanceInfo> = state
        .gateway
        .fetch_instances()
        .await?
        .into_iter()
        .map(|entry| entry.instance)
        .collect();

    Ok(Json(DataResponse { data: instances }))
}

/// GET /api/v1/instances/{name}/status
///
/// A failing connection-state lookup degrades to an `UNKNOWN` state rather
/// than failing the request; the instance record alone may still resolve it.
pub async fn instance_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let info = state
        .gateway
        .fetch_instances()
        .await?
        .into_iter()
        .map(|entry| entry.instance)
        .find(|info| info.instance_name == name)
        .ok_or_else(|| AppError::NotFound(format!("Instance '{name}' not found")))?;

    let connection_state = match state.gateway.connection_state(&name).await {
        Ok(response) => response.state().map(str::to_string),
        Err(e) => {
            tracing::warn!(instance = %name, error = %e, "Connection state lookup failed");
            None
        }
    };

    let report = build_report(&info, connection_state.as_deref());

    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/instances/{name}/check-numbers
pub async fn check_numbers(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(input): Json<CheckNumbersInput>,
) -> AppResult<impl IntoResponse> {
    let numbers: Vec<String> = input
        .numbers
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();

    if numbers.is_empty() {
        return Err(AppError::BadRequest("numbers must not be empty".into()));
    }

    let checks = state.gateway.check_numbers(&name, &numbers).await?;
    let response = summarize_checks(&numbers, &checks);

    tracing::info!(
        instance = %name,
        total = response.summary.total,
        valid = response.summary.valid,
        "Numbers checked",
    );

    Ok(Json(DataResponse { data: response }))
}

/// Pair every requested number with the gateway's answer for it.
///
/// An answer matches on the exact number, then on its digits alone. When
/// the gateway answered once per requested number, an unmatched number
/// takes the answer at its own position. Numbers left without an answer
/// are reported as invalid.
pub fn summarize_checks(numbers: &[String], checks: &[NumberCheck]) -> NumberCheckResponse {
    let positional = checks.len() == numbers.len();
    let results: Vec<NumberCheckResult> = numbers
        .iter()
        .enumerate()
        .map(|(index, number)| {
            let check = checks
                .iter()
                .find(|c| &c.number == number)
                .or_else(|| checks.iter().find(|c| digits(&c.number) == digits(number)))
                .or_else(|| positional.then(|| &checks[index]));
            (number, check)
        })
        .map(|(number, check)| match check {
            Some(check) if check.exists => NumberCheckResult {
                number: number.clone(),
                valid: true,
                jid: Some(check.jid.clone()).filter(|jid| !jid.is_empty()),
                error: None,
            },
            Some(_) => NumberCheckResult {
                number: number.clone(),
                valid: false,
                jid: None,
                error: Some("number is not registered".to_string()),
            },
            None => NumberCheckResult {
                number: number.clone(),
                valid: false,
                jid: None,
                error: Some("no answer from gateway".to_string()),
            },
        })
        .collect();

    let valid = results.iter().filter(|r| r.valid).count();
    let summary = NumberCheckSummary {
        total: results.len(),
        valid,
        invalid: results.len() - valid,
    };

    NumberCheckResponse { results, summary }
}

fn digits(number: &str) -> String {
    number.chars().filter(char::is_ascii_digit).collect()
}
