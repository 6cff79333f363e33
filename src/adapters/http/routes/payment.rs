//! Payment routes: order creation, gateway callback, status lookup.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    application::use_cases::payment::{CreateOrderInput, WebhookRequest},
};

/// Header carrying `"<checksum>###<saltIndex>"` on gateway callbacks.
const VERIFY_HEADER: &str = "X-VERIFY";

/// POST /api/payment/create
async fn create_order(
    State(app_state): State<AppState>,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<impl IntoResponse> {
    let envelope = app_state.payment_use_cases.create_order(input).await?;
    Ok(Json(envelope))
}

/// POST /api/payment/webhook
async fn webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<WebhookRequest>,
) -> AppResult<impl IntoResponse> {
    let verify = headers.get(VERIFY_HEADER).and_then(|v| v.to_str().ok());
    let ack = app_state
        .payment_use_cases
        .process_webhook(body, verify)
        .await?;
    Ok(Json(ack))
}

/// GET /api/payment/status/{transaction_id}
async fn payment_status(
    State(app_state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = app_state
        .payment_use_cases
        .payment_status(&transaction_id)
        .await?;
    Ok(Json(record))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_order))
        .route("/webhook", post(webhook))
        .route("/status/{transaction_id}", get(payment_status))
}
