//! HTTP Handlers
//!
//! Thin proxies over the flow stages. Request bodies use the storefront's
//! camelCase field names; upstream failures keep the upstream status.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use checkout_core::{
    CheckoutError, CheckoutId, CheckoutSummary, FlowLog, OrderId, OrderUpdate, Stage,
    StoreCredentials, TokenOrigin,
};
use checkout_flow::{FlowRequest, FlowResult};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialsRequest {
    pub store_hash: String,
    pub access_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutRequest {
    pub store_hash: String,
    pub access_token: String,
    pub checkout_id: String,
}

/// `orderId` arrives as a number or a string
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderRequest {
    pub store_hash: String,
    pub access_token: String,
    pub order_id: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderUpdateRequest {
    pub store_hash: String,
    pub access_token: String,
    pub order_id: Option<Value>,
    pub order_data: Option<OrderUpdate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalPaymentRequest {
    pub store_hash: String,
    pub access_token: String,
    pub checkout_id: String,
    pub order_data: Option<OrderUpdate>,
    pub store_base_url: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub gateway: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub origin: TokenOrigin,
    pub log: FlowLog,
}

// ============================================================================
// Errors
// ============================================================================

/// `CheckoutError` rendered as `{error, details?}`
#[derive(Debug)]
pub struct ApiError(CheckoutError);

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        if let Some(status) = self.0.upstream_status() {
            return StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
        }
        match self.0 {
            CheckoutError::Validation(_) => StatusCode::BAD_REQUEST,
            CheckoutError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            CheckoutError::MissingOrderId
            | CheckoutError::MalformedResponse(_)
            | CheckoutError::Transport(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self.0.upstream_status() {
            Some(_) => {
                let status = self.status();
                format!(
                    "API Error: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                )
                .trim_end()
                .to_string()
            }
            None => self.0.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retryable = self.0.is_retryable();
        if status.is_server_error() {
            tracing::error!(error = %self.0, retryable, "request failed");
        } else {
            tracing::warn!(error = %self.0, retryable, "request rejected");
        }

        let body = match self.0.upstream_body() {
            Some(details) => json!({ "error": self.message(), "details": details }),
            None => json!({ "error": self.message() }),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn missing() -> ApiError {
    ApiError(CheckoutError::Validation("missing required parameters".into()))
}

/// Unreadable bodies are reported like missing fields
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(v)| v).map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "request body rejected");
        missing()
    })
}

fn require(fields: &[&str]) -> Result<(), ApiError> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(missing());
    }
    Ok(())
}

fn parse_order_id(raw: Option<&Value>) -> Result<OrderId, ApiError> {
    raw.and_then(OrderId::from_json).ok_or_else(missing)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        gateway: state.gateway.name().to_string(),
    })
}

/// Check credentials against the catalog summary endpoint
pub async fn validate_credentials(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req = body(payload)?;
    require(&[&req.store_hash, &req.access_token])?;

    let credentials = StoreCredentials::new(req.store_hash, req.access_token);
    match state.inspector.validate_credentials(&credentials).await {
        Ok(()) => Ok(Json(json!({ "success": true })).into_response()),
        Err(err) if err.upstream_status().is_some() => {
            let err = ApiError(err);
            let status = err.status();
            Ok((status, Json(json!({ "success": false, "error": err.message() }))).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// Raw checkout payload
pub async fn get_checkout(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let req = body(payload)?;
    require(&[&req.store_hash, &req.access_token, &req.checkout_id])?;

    let credentials = StoreCredentials::new(req.store_hash, req.access_token);
    let checkout = state
        .inspector
        .fetch_raw(&credentials, &CheckoutId::new(req.checkout_id))
        .await?;
    Ok(Json(checkout))
}

/// Formatted checkout digest
pub async fn checkout_summary(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<CheckoutSummary> {
    let req = body(payload)?;
    require(&[&req.store_hash, &req.access_token, &req.checkout_id])?;

    let credentials = StoreCredentials::new(req.store_hash, req.access_token);
    let summary = state
        .inspector
        .summarize(&credentials, &CheckoutId::new(req.checkout_id))
        .await?;
    Ok(Json(summary))
}

/// Session token; falls back to a synthesized token instead of failing
pub async fn generate_token(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let req = body(payload)?;
    require(&[&req.store_hash, &req.access_token, &req.checkout_id])?;

    let credentials = StoreCredentials::new(req.store_hash, req.access_token);
    let checkout_id = CheckoutId::new(req.checkout_id);
    tracing::info!(%checkout_id, "generating checkout token");

    let mut log = FlowLog::new();
    let token = state.tokens.issue(&credentials, &checkout_id, &mut log).await?;
    Ok(Json(TokenResponse {
        token: token.as_str().to_string(),
        origin: token.origin(),
        log,
    }))
}

/// Convert a checkout into an order
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let req = body(payload)?;
    require(&[&req.store_hash, &req.access_token, &req.checkout_id])?;

    let credentials = StoreCredentials::new(req.store_hash, req.access_token);
    let checkout_id = CheckoutId::new(req.checkout_id);
    tracing::info!(%checkout_id, "creating order");

    let order = state.converter.convert(&credentials, &checkout_id).await?;
    Ok(Json(order.raw))
}

pub async fn order_details(
    State(state): State<AppState>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let req = body(payload)?;
    require(&[&req.store_hash, &req.access_token])?;
    let order_id = parse_order_id(req.order_id.as_ref())?;

    let credentials = StoreCredentials::new(req.store_hash, req.access_token);
    let details = state.details.fetch(&credentials, &order_id).await?;
    Ok(Json(details.raw))
}

/// Apply payment method, transaction id and status to an order
pub async fn update_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderUpdateRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let req = body(payload)?;
    require(&[&req.store_hash, &req.access_token])?;
    let order_id = parse_order_id(req.order_id.as_ref())?;
    let update = req.order_data.ok_or_else(missing)?;

    let credentials = StoreCredentials::new(req.store_hash, req.access_token);
    tracing::info!(%order_id, status = %update.status_label(), "updating order");

    let updated = state.updater.apply(&credentials, &order_id, &update).await?;
    Ok(Json(updated))
}

/// Run the whole pipeline server side
///
/// A failed run is still answered with its `FlowResult`: 400 when the flow
/// rejected its input at `init`, 502 when a remote stage failed. Only an
/// unreadable body gets the bare `{error}` response.
pub async fn external_payment(
    State(state): State<AppState>,
    payload: Result<Json<ExternalPaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FlowResult>), ApiError> {
    let req = body(payload)?;

    let mut request = FlowRequest::new(
        StoreCredentials::new(req.store_hash, req.access_token),
        req.checkout_id,
    );
    if let Some(update) = req.order_data {
        request = request.with_update(update);
    }
    if let Some(base) = req.store_base_url {
        request = request.with_store_base_url(base);
    }

    let result = state.flow.run(request).await;
    let status = match result.failed_stage() {
        None => StatusCode::OK,
        Some(Stage::Init) => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::BAD_GATEWAY,
    };
    Ok((status, Json(result)))
}
