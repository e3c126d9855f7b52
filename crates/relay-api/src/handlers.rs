//! # Request Handlers
//!
//! Axum request handlers for the payment relay.
//! Approve and complete forward to the payment platform and relay its answer.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use relay_core::{Expectations, RelayError, RelayResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Approve request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    #[serde(default)]
    pub payment_id: Option<Value>,
    /// Amount the client believes the payment carries (optional)
    #[serde(default)]
    pub expected_amount: Option<Value>,
    /// Memo the client believes the payment carries (optional)
    #[serde(default)]
    pub expected_memo: Option<Value>,
}

impl ApproveRequest {
    pub fn expectations(&self) -> Expectations {
        Expectations::new(self.expected_amount.clone(), self.expected_memo.clone())
    }
}

/// Complete request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    #[serde(default)]
    pub payment_id: Option<Value>,
    #[serde(default)]
    pub txid: Option<Value>,
}

/// Config response; the API key only ever appears masked
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub allowed_origin: Vec<String>,
    pub has_api_key: bool,
    pub api_key_masked: Option<String>,
    pub validate: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub got: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            got: None,
            expected: None,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Platform operation a request maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Approve,
    Complete,
}

impl Operation {
    /// Error code reported when the platform call fails
    pub fn failure_code(self) -> &'static str {
        match self {
            Operation::Approve => "approve_failed",
            Operation::Complete => "complete_failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Approve => f.write_str("approve"),
            Operation::Complete => f.write_str("complete"),
        }
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

fn relay_error_to_response(
    operation: Operation,
    err: RelayError,
) -> (StatusCode, Json<ErrorResponse>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let response = match err {
        RelayError::MissingField(message) => ErrorResponse::new(message),
        RelayError::Mismatch {
            field,
            got,
            expected,
        } => ErrorResponse {
            error: format!("{} mismatch", field),
            got: Some(got),
            expected: Some(expected),
            detail: None,
        },
        other => ErrorResponse::new(operation.failure_code()).with_detail(other.detail()),
    };

    (status, Json(response))
}

/// Identifier fields must be non-empty; non-zero numbers are accepted in their decimal form
fn required_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// Current configuration, with the API key masked
pub async fn config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let config = &state.config;
    Json(ConfigResponse {
        allowed_origin: config.allowed_origins.clone(),
        has_api_key: config.pi.has_api_key(),
        api_key_masked: config.pi.masked_key(),
        validate: config.validate,
    })
}

/// Approve a payment, optionally checking it against the platform's record first
#[instrument(skip(state, payload))]
pub async fn approve(
    State(state): State<AppState>,
    payload: Result<Json<ApproveRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let started = Instant::now();
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    let payment_id = required_string(request.payment_id.as_ref()).ok_or_else(|| {
        relay_error_to_response(Operation::Approve, RelayError::missing("paymentId required"))
    })?;

    match approve_payment(&state, &payment_id, &request.expectations()).await {
        Ok(data) => {
            info!(
                "[APPROVE] {} -> OK in {}ms",
                payment_id,
                started.elapsed().as_millis()
            );
            Ok(Json(data))
        }
        Err(e) => {
            log_failure(Operation::Approve, &payment_id, &e);
            Err(relay_error_to_response(Operation::Approve, e))
        }
    }
}

async fn approve_payment(
    state: &AppState,
    payment_id: &str,
    expected: &Expectations,
) -> RelayResult<Value> {
    if state.config.validate {
        let record = state.platform.get_payment(payment_id).await?;
        record.verify(expected)?;
    }

    state.platform.approve(payment_id).await
}

/// Complete a payment with its blockchain transaction id
#[instrument(skip(state, payload))]
pub async fn complete(
    State(state): State<AppState>,
    payload: Result<Json<CompleteRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let started = Instant::now();
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    let (payment_id, txid) = match (
        required_string(request.payment_id.as_ref()),
        required_string(request.txid.as_ref()),
    ) {
        (Some(payment_id), Some(txid)) => (payment_id, txid),
        _ => {
            return Err(relay_error_to_response(
                Operation::Complete,
                RelayError::missing("paymentId and txid required"),
            ))
        }
    };

    match state.platform.complete(&payment_id, &txid).await {
        Ok(data) => {
            info!(
                "[COMPLETE] {} -> OK in {}ms tx={}",
                payment_id,
                started.elapsed().as_millis(),
                txid
            );
            Ok(Json(data))
        }
        Err(e) => {
            log_failure(Operation::Complete, &payment_id, &e);
            Err(relay_error_to_response(Operation::Complete, e))
        }
    }
}

fn log_failure(operation: Operation, payment_id: &str, err: &RelayError) {
    if err.is_client_error() {
        warn!("[{}] {} rejected: {}", operation, payment_id, err);
    } else {
        error!(
            "[{}] {} ERR status={} detail={}",
            operation,
            payment_id,
            err.status_code(),
            err.detail()
        );
    }
}

/// Unknown routes
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("not found")))
}
