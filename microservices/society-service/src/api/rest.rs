//! Society Service REST API

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use samaj_core::{Claims, PhoneNumber, Role, SamajError, UserType};
use serde::Deserialize;
use uuid::Uuid;

use crate::types::{BankAccount, Member};
use crate::{AuthService, NotificationService, RegistryService};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub registry: RegistryService,
    pub notifications: NotificationService,
}

type ApiError = (StatusCode, Json<serde_json::Value>);
type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn create_router(
    auth_service: AuthService,
    registry: RegistryService,
    notifications: NotificationService,
) -> Router {
    let state = AppState {
        auth_service,
        registry,
        notifications,
    };

    Router::new()
        // Health
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Auth
        .route("/api/auth/send-otp", post(send_otp))
        .route("/api/auth/verify-otp", post(verify_otp))
        .route("/api/auth/me", get(me))
        // Society
        .route("/api/society/create", post(create_society))
        .route("/api/society/search", get(search_societies))
        .route("/api/society/{id}/bank-details", put(update_bank_details))
        .route(
            "/api/society/{id}/maintenance-rates",
            put(update_maintenance_rates),
        )
        .route("/api/society/{id}/join", post(join_society))
        .route("/api/society/{id}/members", get(society_members))
        .route("/api/society/{id}/details", get(society_details))
        // Service-to-service lookups
        .route("/api/internal/members/{id}", get(member_record))
        .route("/api/internal/societies/{id}", get(society_record))
        // Notifications
        .route("/api/notifications/create", post(create_notification))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/mark-read", post(mark_notifications_read))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
async fn ready() -> &'static str {
    "OK"
}

fn error_response(e: SamajError) -> ApiError {
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
        .ok_or_else(|| error_response(SamajError::Auth("Missing bearer token".to_string())))?;

    state
        .auth_service
        .keys()
        .validate(token)
        .map_err(error_response)
}

fn current_member(state: &AppState, headers: &HeaderMap) -> Result<Member, ApiError> {
    let claims = authenticate(state, headers)?;
    let member_id = claims.member_id().map_err(error_response)?;
    state.registry.member(member_id).map_err(error_response)
}

// Auth endpoints

#[derive(Deserialize)]
struct SendOtpRequest {
    phone_number: String,
}

async fn send_otp(
    State(state): State<AppState>,
    Json(req): Json<SendOtpRequest>,
) -> Json<serde_json::Value> {
    let phone = PhoneNumber::new(req.phone_number);
    let otp = state.auth_service.issue_otp(&phone);

    // Returned in the body until an SMS gateway is wired in.
    Json(serde_json::json!({ "message": "OTP sent successfully", "otp": otp }))
}

#[derive(Deserialize)]
struct VerifyOtpRequest {
    phone_number: String,
    otp: String,
    name: String,
    role: Role,
}

async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> ApiResult<serde_json::Value> {
    let phone = PhoneNumber::new(req.phone_number);
    state
        .auth_service
        .check_otp(&phone, &req.otp)
        .map_err(error_response)?;

    let member = state
        .registry
        .find_or_create_member(&phone, &req.name, req.role);

    let token = state
        .auth_service
        .generate_token(member.id, &member.phone_number, member.role)
        .map_err(error_response)?;

    state.auth_service.consume_otp(&phone);

    Ok(Json(serde_json::json!({ "token": token, "user": member })))
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Member> {
    let member = current_member(&state, &headers)?;
    Ok(Json(member))
}

// Society endpoints

#[derive(Deserialize)]
struct CreateSocietyRequest {
    name: String,
    address: String,
}

async fn create_society(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateSocietyRequest>,
) -> ApiResult<crate::types::Society> {
    let member = current_member(&state, &headers)?;
    let society = state
        .registry
        .create_society(&member, &req.name, &req.address)
        .map_err(error_response)?;
    Ok(Json(society))
}

#[derive(Deserialize)]
struct SearchQuery {
    query: String,
}

async fn search_societies(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Vec<crate::types::Society>> {
    current_member(&state, &headers)?;
    Ok(Json(state.registry.search(&params.query)))
}

#[derive(Deserialize)]
struct UpdateBankDetailsRequest {
    bank_account_number: String,
    bank_ifsc: String,
    bank_name: String,
}

async fn update_bank_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(society_id): Path<Uuid>,
    Json(req): Json<UpdateBankDetailsRequest>,
) -> ApiResult<serde_json::Value> {
    let member = current_member(&state, &headers)?;
    state
        .registry
        .update_bank_details(
            society_id,
            member.id,
            BankAccount {
                account_number: req.bank_account_number,
                ifsc: req.bank_ifsc,
                bank_name: req.bank_name,
            },
        )
        .map_err(error_response)?;
    Ok(Json(
        serde_json::json!({ "message": "Bank details updated successfully" }),
    ))
}

#[derive(Deserialize)]
struct UpdateMaintenanceRatesRequest {
    owner_rate: Decimal,
    tenant_rate: Decimal,
}

async fn update_maintenance_rates(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(society_id): Path<Uuid>,
    Json(req): Json<UpdateMaintenanceRatesRequest>,
) -> ApiResult<serde_json::Value> {
    let member = current_member(&state, &headers)?;
    state
        .registry
        .update_maintenance_rates(society_id, member.id, req.owner_rate, req.tenant_rate)
        .map_err(error_response)?;
    Ok(Json(
        serde_json::json!({ "message": "Maintenance rates updated successfully" }),
    ))
}

#[derive(Deserialize)]
struct JoinSocietyRequest {
    user_type: UserType,
}

async fn join_society(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(society_id): Path<Uuid>,
    Json(req): Json<JoinSocietyRequest>,
) -> ApiResult<serde_json::Value> {
    let member = current_member(&state, &headers)?;
    state
        .registry
        .join_society(member.id, society_id, req.user_type)
        .map_err(error_response)?;
    Ok(Json(
        serde_json::json!({ "message": "Successfully joined society" }),
    ))
}

async fn society_members(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(society_id): Path<Uuid>,
) -> ApiResult<Vec<Member>> {
    let member = current_member(&state, &headers)?;
    let members = state
        .registry
        .members_of(society_id, member.id)
        .map_err(error_response)?;
    Ok(Json(members))
}

async fn society_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(society_id): Path<Uuid>,
) -> ApiResult<crate::types::Society> {
    current_member(&state, &headers)?;
    let society = state.registry.society(society_id).map_err(error_response)?;
    Ok(Json(society))
}

/// Unauthenticated member lookup for sibling services behind the service
/// mesh; the maintenance service resolves member profiles through this.
async fn member_record(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> ApiResult<Member> {
    let member = state.registry.member(member_id).map_err(error_response)?;
    Ok(Json(member))
}

/// Unauthenticated society lookup for sibling services; the maintenance
/// service reads rates and the chairman id through this.
async fn society_record(
    State(state): State<AppState>,
    Path(society_id): Path<Uuid>,
) -> ApiResult<crate::types::Society> {
    let society = state.registry.society(society_id).map_err(error_response)?;
    Ok(Json(society))
}

// Notification endpoints

#[derive(Deserialize)]
struct CreateNotificationRequest {
    message: String,
}

async fn create_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateNotificationRequest>,
) -> ApiResult<serde_json::Value> {
    let member = current_member(&state, &headers)?;
    if member.role != Role::Chairman {
        return Err(error_response(SamajError::Forbidden(
            "Only chairmen can create notifications".to_string(),
        )));
    }
    let society_id = member.society_id.ok_or_else(|| {
        error_response(SamajError::Validation(
            "You don't have a society".to_string(),
        ))
    })?;

    state.notifications.broadcast(society_id, member.id, &req.message);
    Ok(Json(
        serde_json::json!({ "message": "Notification sent successfully" }),
    ))
}

async fn list_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<serde_json::Value> {
    let member = current_member(&state, &headers)?;
    let Some(society_id) = member.society_id else {
        return Ok(Json(
            serde_json::json!({ "notifications": [], "unread_count": 0 }),
        ));
    };

    let feed = state.notifications.feed_for(society_id, member.id);
    let unread = state.notifications.unread_count(society_id, member.id);
    Ok(Json(
        serde_json::json!({ "notifications": feed, "unread_count": unread }),
    ))
}

#[derive(Deserialize)]
struct MarkReadRequest {
    notification_ids: Vec<Uuid>,
}

async fn mark_notifications_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<MarkReadRequest>,
) -> ApiResult<serde_json::Value> {
    let member = current_member(&state, &headers)?;
    state.notifications.mark_read(member.id, &req.notification_ids);
    Ok(Json(
        serde_json::json!({ "message": "Notifications marked as read" }),
    ))
}
