use crate::api::auth::{self, Claims};
use crate::earning::EarnPolicy;
use crate::error::Error;
use crate::gateway::signature::WebhookVerifier;
use crate::observability::metrics;
use crate::observability::tracing::{trace_earn, trace_webhook};
use crate::settlement::deposit::DepositFlow;
use crate::settlement::withdrawal::{WithdrawalAction, WithdrawalFlow};
use crate::store::streams::StreamRegistry;
use crate::types::ids::{StreamId, WithdrawalId};
use crate::types::money::BrlAmount;
use crate::types::points::Points;
use axum::{
    Json, Router, middleware,
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::Instrument;

pub struct ApiState {
    pub earn: EarnPolicy,
    pub deposits: DepositFlow,
    pub withdrawals: WithdrawalFlow,
    pub streams: Arc<RwLock<StreamRegistry>>,
    pub webhook_verifier: WebhookVerifier,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    let authed = Router::new()
        .route("/earn-points", post(earn_points))
        .route("/create-pix-payment", post(create_pix_payment))
        .route("/withdrawal-request", post(withdrawal_request))
        .route("/handle-withdrawal", post(handle_withdrawal))
        .route_layer(middleware::from_fn(auth::auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/mercado-pago-webhook", post(mercado_pago_webhook))
        .route("/update-viewer-count", post(update_viewer_count))
        .merge(authed)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics_endpoint() -> Result<String, ApiError> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&metrics::REGISTRY.gather(), &mut buffer)
        .map_err(|e| ApiError(Error::ConfigError(e.to_string())))?;
    String::from_utf8(buffer).map_err(|e| ApiError(Error::ConfigError(e.to_string())))
}

/// JSON error body plus a status derived from the error taxonomy.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Unauthorized
            | Error::AuthenticationError(_)
            | Error::InvalidWebhookSignature => StatusCode::UNAUTHORIZED,
            Error::AdminRequired => StatusCode::FORBIDDEN,
            Error::InvalidAmount
            | Error::InvalidPixKey(_)
            | Error::BelowMinimumWithdrawal { .. }
            | Error::InsufficientBalance { .. }
            | Error::StreamNotLive(_) => StatusCode::BAD_REQUEST,
            Error::CooldownActive { .. } | Error::IpAccountLimitReached => {
                StatusCode::TOO_MANY_REQUESTS
            }
            Error::StreamNotFound(_)
            | Error::AccountNotFound(_)
            | Error::DepositNotFound(_)
            | Error::WithdrawalNotFound(_) => StatusCode::NOT_FOUND,
            Error::WithdrawalNotPending(_) => StatusCode::CONFLICT,
            Error::GatewayError(_) => StatusCode::BAD_GATEWAY,
            Error::ReconciliationAnomaly(_)
            | Error::LedgerMismatch { .. }
            | Error::ConfigError(_)
            | Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Prefer the forwarding header set by the edge proxy, fall back to the
/// socket peer address.
fn client_ip(headers: &HeaderMap, addr: &SocketAddr) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_else(|| addr.ip())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EarnRequest {
    stream_id: StreamId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EarnResponse {
    success: bool,
    points_earned: i64,
}

async fn earn_points(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    axum::Extension(claims): axum::Extension<Claims>,
    headers: HeaderMap,
    Json(req): Json<EarnRequest>,
) -> Result<Json<EarnResponse>, ApiError> {
    let user_id = claims.user_id()?;
    let ip = client_ip(&headers, &addr);

    let earned = state
        .earn
        .earn(user_id, req.stream_id, ip)
        .instrument(trace_earn(&user_id, &req.stream_id))
        .await?;

    Ok(Json(EarnResponse {
        success: true,
        points_earned: earned.to_i64(),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePixRequest {
    amount_brl: f64,
    first_name: String,
    last_name: String,
    cpf: String,
}

#[derive(Serialize)]
struct CreatePixResponse {
    payment_id: String,
    qr_code: String,
    qr_code_base64: String,
}

async fn create_pix_payment(
    State(state): State<Arc<ApiState>>,
    axum::Extension(claims): axum::Extension<Claims>,
    Json(req): Json<CreatePixRequest>,
) -> Result<Json<CreatePixResponse>, ApiError> {
    let user_id = claims.user_id()?;

    let payer = crate::interfaces::payment_gateway::Payer {
        first_name: req.first_name,
        last_name: req.last_name,
        cpf: req.cpf,
    };

    let intent = state
        .deposits
        .create(user_id, BrlAmount::from_reais(req.amount_brl), payer)
        .await?;

    Ok(Json(CreatePixResponse {
        payment_id: intent.payment_id,
        qr_code: intent.qr_code,
        qr_code_base64: intent.qr_code_base64,
    }))
}

#[derive(Deserialize, Default)]
struct WebhookBody {
    #[serde(default)]
    data: Option<WebhookData>,
}

#[derive(Deserialize)]
struct WebhookData {
    id: Option<serde_json::Value>,
}

async fn mercado_pago_webhook(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Option<Json<WebhookBody>>,
) -> StatusCode {
    let data_id = params
        .get("data.id")
        .cloned()
        .or_else(|| {
            body.as_ref()
                .and_then(|b| b.data.as_ref())
                .and_then(|d| d.id.as_ref())
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
        })
        .unwrap_or_default();

    let signature = headers
        .get("x-signature")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    let request_id = headers
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    if state
        .webhook_verifier
        .verify(signature, request_id, &data_id)
        .is_err()
    {
        metrics::WEBHOOK_SIGNATURE_FAILURES.inc();
        tracing::warn!(%data_id, "webhook rejected: bad signature");
        return StatusCode::UNAUTHORIZED;
    }

    // The gateway's webhook simulator sends a fixed synthetic payment id;
    // acknowledge it without touching any deposit.
    if data_id == crate::SYNTHETIC_WEBHOOK_PAYMENT_ID {
        return StatusCode::OK;
    }

    // Always 200 from here on: redelivery of an already-handled event must
    // not look like a failure to the gateway.
    if let Err(e) = state
        .deposits
        .reconcile(&data_id)
        .instrument(trace_webhook(&data_id))
        .await
    {
        tracing::error!(payment_id = %data_id, error = %e, "webhook reconciliation failed");
    }
    StatusCode::OK
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawalRequest {
    amount_points: i64,
    pix_key_type: crate::store::withdrawal_store::PixKeyType,
    pix_key: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

async fn withdrawal_request(
    State(state): State<Arc<ApiState>>,
    axum::Extension(claims): axum::Extension<Claims>,
    Json(req): Json<WithdrawalRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = claims.user_id()?;

    let withdrawal = state
        .withdrawals
        .request(
            user_id,
            Points::from_i64(req.amount_points),
            req.pix_key_type,
            req.pix_key,
        )
        .await?;

    Ok(Json(MessageResponse {
        message: format!(
            "Withdrawal of {} points received; {} will be paid to your PIX key once approved",
            withdrawal.amount_points, withdrawal.amount
        ),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HandleWithdrawalRequest {
    withdrawal_id: WithdrawalId,
    action: WithdrawalAction,
}

async fn handle_withdrawal(
    State(state): State<Arc<ApiState>>,
    axum::Extension(claims): axum::Extension<Claims>,
    Json(req): Json<HandleWithdrawalRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    claims.require_admin()?;

    let withdrawal = state
        .withdrawals
        .decide(req.withdrawal_id, req.action)
        .await?;

    let message = match req.action {
        WithdrawalAction::Approve => format!("Withdrawal {} approved", withdrawal.id),
        WithdrawalAction::Reject => format!("Withdrawal {} rejected", withdrawal.id),
    };
    Ok(Json(MessageResponse { message }))
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum ViewerAction {
    Join,
    Leave,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewerCountRequest {
    stream_id: StreamId,
    action: ViewerAction,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

async fn update_viewer_count(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<ViewerCountRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let mut streams = state.streams.write().await;
    match req.action {
        ViewerAction::Join => streams.viewer_joined(req.stream_id)?,
        ViewerAction::Leave => streams.viewer_left(req.stream_id)?,
    };
    Ok(Json(SuccessResponse { success: true }))
}
