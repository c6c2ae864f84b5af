use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use bytes::Bytes;
use common_http_errors::{ApiError, ApiResult};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::service::{PaymentSessionRequest, PaymentSessionResponse};
use crate::signature::SIGNATURE_HEADER;

pub async fn create_payment_session(
    State(state): State<AppState>,
    payload: Result<Json<PaymentSessionRequest>, JsonRejection>,
) -> ApiResult<Json<PaymentSessionResponse>> {
    let Json(req) = payload.map_err(|rejection| ApiError::bad_request("invalid_payload", rejection.body_text()))?;
    let session = state.service.create_payment_session(req).await?;
    Ok(Json(session))
}

/// Takes the body as raw bytes: the signature covers the exact bytes Stripe sent.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let outcome = state.service.handle_webhook(&body, signature).await?;
    Ok(Json(json!({ "event": outcome.event })))
}

pub async fn payment_success() -> Json<Value> {
    Json(json!({ "ok": true, "message": "Payment successful" }))
}

pub async fn payment_cancelled() -> Json<Value> {
    Json(json!({ "ok": false, "message": "Payment cancelled" }))
}
