//! Maintenance Service REST API

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use samaj_core::{Claims, Month, SamajError, TokenKeys};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::directory::MemberDirectory;
use crate::error::PaymentError;
use crate::ledger::PaymentLedger;
use crate::orders::OrderManager;
use crate::rates::RateResolver;
use crate::types::{Membership, OrderDescriptor, Receipt};

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn MemberDirectory>,
    pub manager: OrderManager,
    pub ledger: PaymentLedger,
    pub keys: TokenKeys,
}

type ApiError = (StatusCode, Json<serde_json::Value>);
type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn create_router(
    directory: Arc<dyn MemberDirectory>,
    manager: OrderManager,
    ledger: PaymentLedger,
    keys: TokenKeys,
) -> Router {
    let state = AppState {
        directory,
        manager,
        ledger,
        keys,
    };

    Router::new()
        // Health
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Maintenance due
        .route("/api/user/maintenance", get(maintenance_due))
        // Payment lifecycle
        .route("/api/payment/create-order", post(create_order))
        .route("/api/payment/verify", post(verify_payment))
        .route("/api/payment/receipts", get(list_receipts))
        // Chairman view over the society ledger
        .route("/api/society/{id}/payments", get(society_payments))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
async fn ready() -> &'static str {
    "OK"
}

fn auth_error(e: SamajError) -> ApiError {
    (
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(serde_json::json!({ "error": e.to_string(), "code": e.error_code() })),
    )
}

fn payment_error(e: PaymentError) -> ApiError {
    (
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(serde_json::json!({ "error": e.to_string(), "code": e.error_code() })),
    )
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Claims, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| auth_error(SamajError::Auth("Missing bearer token".to_string())))?;

    state.keys.validate(token).map_err(auth_error)
}

/// Resolve the caller's society membership or fail with a 400.
async fn current_membership(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Membership, ApiError> {
    let claims = authenticate(state, headers)?;
    let member_id = claims.member_id().map_err(auth_error)?;

    let profile = state
        .directory
        .profile(member_id)
        .await
        .map_err(payment_error)?;

    profile.membership().ok_or_else(|| {
        auth_error(SamajError::Validation(
            "You are not part of any society".to_string(),
        ))
    })
}

// Maintenance due

async fn maintenance_due(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<serde_json::Value> {
    let membership = current_membership(&state, &headers).await?;
    let rates = state
        .directory
        .rate_card(membership.society_id)
        .await
        .map_err(payment_error)?;

    let month = Month::current();
    match RateResolver::resolve_due(&membership, &rates, month) {
        Ok(due) => Ok(Json(serde_json::json!({
            "amount": due.amount,
            "user_type": due.user_type,
            "society_name": rates.society_name,
            "month": month,
            "paid": state.ledger.is_paid(membership.member_id, month),
        }))),
        // Unset rate is reported as such; order creation would refuse it.
        Err(PaymentError::RateNotConfigured(user_type)) => Ok(Json(serde_json::json!({
            "amount": serde_json::Value::Null,
            "user_type": user_type,
            "society_name": rates.society_name,
            "month": month,
            "paid": false,
        }))),
        Err(e) => Err(payment_error(e)),
    }
}

// Payment lifecycle

#[derive(Deserialize)]
struct CreateOrderRequest {
    amount: Decimal,
    month: Month,
}

async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<OrderDescriptor> {
    let membership = current_membership(&state, &headers).await?;
    let rates = state
        .directory
        .rate_card(membership.society_id)
        .await
        .map_err(payment_error)?;

    let descriptor = state
        .manager
        .create_order(&membership, &rates, req.month, req.amount)
        .await
        .map_err(payment_error)?;
    Ok(Json(descriptor))
}

#[derive(Deserialize)]
struct VerifyPaymentRequest {
    gateway_order_id: String,
    gateway_payment_id: String,
    gateway_signature: String,
}

async fn verify_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<VerifyPaymentRequest>,
) -> ApiResult<Receipt> {
    let membership = current_membership(&state, &headers).await?;

    // Members can only verify their own orders.
    let owned = state
        .manager
        .order(&req.gateway_order_id)
        .map(|o| o.member_id == membership.member_id)
        .unwrap_or(false);
    if !owned {
        return Err(payment_error(PaymentError::OrderNotFound(
            req.gateway_order_id,
        )));
    }

    let receipt = state
        .manager
        .verify_and_record(
            &req.gateway_order_id,
            &req.gateway_payment_id,
            &req.gateway_signature,
        )
        .map_err(payment_error)?;
    Ok(Json(receipt))
}

async fn list_receipts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Vec<Receipt>> {
    let claims = authenticate(&state, &headers)?;
    let member_id = claims.member_id().map_err(auth_error)?;
    Ok(Json(state.ledger.list_receipts(member_id)))
}

async fn society_payments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(society_id): Path<Uuid>,
) -> ApiResult<Vec<Receipt>> {
    let claims = authenticate(&state, &headers)?;
    let member_id = claims.member_id().map_err(auth_error)?;

    let rates = state
        .directory
        .rate_card(society_id)
        .await
        .map_err(payment_error)?;
    if rates.chairman_id != member_id {
        return Err(auth_error(SamajError::Forbidden(
            "Only the chairman can view payments".to_string(),
        )));
    }

    Ok(Json(state.ledger.society_receipts(society_id)))
}
