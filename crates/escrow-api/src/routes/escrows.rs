//! # Escrow API
//!
//! Escrow lifecycle endpoints: create, release, cancel, lookup, listing and
//! audit history. Mutating endpoints require a [`CallerIdentity`]; reads do
//! not.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use escrow_core::{AccountId, EscrowId};
use escrow_ledger::{EscrowRecord, EscrowStatus, LedgerEvent, Movement};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::CallerIdentity;
use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Request to lock funds for a payee.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEscrowRequest {
    /// Account that will receive payment on release.
    pub payee: String,
    /// Amount to move from the caller into custody.
    pub amount: u64,
}

impl Validate for CreateEscrowRequest {
    fn validate(&self) -> Result<(), String> {
        AccountId::new(&self.payee)
            .map(|_| ())
            .map_err(|e| format!("payee: {e}"))
    }
}

/// Response to a successful creation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateEscrowResponse {
    pub id: u64,
}

/// Response to a successful release.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReleaseResponse {
    pub id: u64,
    pub released: bool,
}

/// Response to a successful cancellation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelResponse {
    pub id: u64,
    pub cancelled: bool,
}

/// Wire form of an escrow record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EscrowView {
    pub id: u64,
    pub payer: String,
    pub payee: String,
    pub amount: u64,
    /// One of `ACTIVE`, `RELEASED`, `CANCELLED`.
    pub status: String,
    /// Logical height at creation.
    pub created_at: u64,
}

impl From<EscrowRecord> for EscrowView {
    fn from(record: EscrowRecord) -> Self {
        Self {
            id: record.id.get(),
            payer: record.payer.to_string(),
            payee: record.payee.to_string(),
            amount: record.amount,
            status: record.status.as_str().to_string(),
            created_at: record.created_at.height(),
        }
    }
}

/// Lookup result. `escrow` is null when no record has the requested id.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GetEscrowResponse {
    pub escrow: Option<EscrowView>,
}

/// Listing result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListEscrowsResponse {
    pub escrows: Vec<EscrowView>,
    pub count: usize,
}

/// Listing filter.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Restrict to one status (case-insensitive).
    pub status: Option<String>,
}

/// Wire form of a value movement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovementView {
    pub from: String,
    pub to: String,
    pub amount: u64,
}

impl From<Movement> for MovementView {
    fn from(m: Movement) -> Self {
        Self {
            from: m.from.to_string(),
            to: m.to.to_string(),
            amount: m.amount,
        }
    }
}

/// Wire form of a journal entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventView {
    pub sequence: u64,
    /// One of `created`, `released`, `cancelled`.
    pub kind: String,
    pub actor: String,
    pub height: u64,
    pub recorded_at: DateTime<Utc>,
    pub movements: Vec<MovementView>,
}

impl From<LedgerEvent> for EventView {
    fn from(event: LedgerEvent) -> Self {
        let kind = match event.kind {
            escrow_ledger::EventKind::Created => "created",
            escrow_ledger::EventKind::Released => "released",
            escrow_ledger::EventKind::Cancelled => "cancelled",
        };
        Self {
            sequence: event.sequence,
            kind: kind.to_string(),
            actor: event.actor.to_string(),
            height: event.height.height(),
            recorded_at: event.recorded_at,
            movements: event.movements.into_iter().map(MovementView::from).collect(),
        }
    }
}

/// Audit history of one escrow.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    pub id: u64,
    pub events: Vec<EventView>,
}

/// Build the escrows router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/escrows", post(create_escrow).get(list_escrows))
        .route("/v1/escrows/:id", get(get_escrow))
        .route("/v1/escrows/:id/release", post(release_funds))
        .route("/v1/escrows/:id/cancel", post(cancel_escrow))
        .route("/v1/escrows/:id/history", get(escrow_history))
}

fn escrow_id(path: Result<Path<u64>, PathRejection>) -> Result<EscrowId, AppError> {
    path.map(|Path(raw)| EscrowId::new(raw))
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// POST /v1/escrows: Lock the caller's funds for a payee.
#[utoipa::path(
    post,
    path = "/v1/escrows",
    request_body = CreateEscrowRequest,
    params(("x-caller-account" = String, Header, description = "Caller account id")),
    responses(
        (status = 201, description = "Escrow created", body = CreateEscrowResponse),
        (status = 401, description = "Missing caller", body = ErrorBody),
        (status = 402, description = "Funds could not be moved", body = ErrorBody),
        (status = 422, description = "Zero amount or invalid payee", body = ErrorBody),
    ),
    tag = "escrows"
)]
pub(crate) async fn create_escrow(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateEscrowRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateEscrowResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let payee = AccountId::new(req.payee)?;
    let id = state
        .ledger
        .create_escrow(&caller.account, payee, req.amount)?;
    Ok((StatusCode::CREATED, Json(CreateEscrowResponse { id: id.get() })))
}

/// POST /v1/escrows/:id/release: Pay out an active escrow.
#[utoipa::path(
    post,
    path = "/v1/escrows/{id}/release",
    params(
        ("id" = u64, Path, description = "Escrow id"),
        ("x-caller-account" = String, Header, description = "Caller account id"),
    ),
    responses(
        (status = 200, description = "Funds released", body = ReleaseResponse),
        (status = 403, description = "Caller is not the administrator", body = ErrorBody),
        (status = 404, description = "Unknown escrow", body = ErrorBody),
        (status = 409, description = "Escrow is not active", body = ErrorBody),
    ),
    tag = "escrows"
)]
pub(crate) async fn release_funds(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<ReleaseResponse>, AppError> {
    let id = escrow_id(path)?;
    let released = state.ledger.release_funds(&caller.account, id)?;
    Ok(Json(ReleaseResponse {
        id: id.get(),
        released,
    }))
}

/// POST /v1/escrows/:id/cancel: Refund an active escrow to its payer.
#[utoipa::path(
    post,
    path = "/v1/escrows/{id}/cancel",
    params(
        ("id" = u64, Path, description = "Escrow id"),
        ("x-caller-account" = String, Header, description = "Caller account id"),
    ),
    responses(
        (status = 200, description = "Escrow cancelled", body = CancelResponse),
        (status = 403, description = "Caller is not the administrator", body = ErrorBody),
        (status = 404, description = "Unknown escrow", body = ErrorBody),
        (status = 409, description = "Escrow is not active", body = ErrorBody),
    ),
    tag = "escrows"
)]
pub(crate) async fn cancel_escrow(
    State(state): State<AppState>,
    caller: CallerIdentity,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<CancelResponse>, AppError> {
    let id = escrow_id(path)?;
    let cancelled = state.ledger.cancel_escrow(&caller.account, id)?;
    Ok(Json(CancelResponse {
        id: id.get(),
        cancelled,
    }))
}

/// GET /v1/escrows/:id: Look up one escrow.
#[utoipa::path(
    get,
    path = "/v1/escrows/{id}",
    params(("id" = u64, Path, description = "Escrow id")),
    responses(
        (status = 200, description = "Lookup result; escrow is null if absent", body = GetEscrowResponse),
    ),
    tag = "escrows"
)]
pub(crate) async fn get_escrow(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<GetEscrowResponse>, AppError> {
    let id = escrow_id(path)?;
    let escrow = state.ledger.get_escrow(id).map(EscrowView::from);
    Ok(Json(GetEscrowResponse { escrow }))
}

/// GET /v1/escrows: List escrows in id order.
#[utoipa::path(
    get,
    path = "/v1/escrows",
    params(ListQuery),
    responses(
        (status = 200, description = "Escrows", body = ListEscrowsResponse),
        (status = 422, description = "Unknown status filter", body = ErrorBody),
    ),
    tag = "escrows"
)]
pub(crate) async fn list_escrows(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListEscrowsResponse>, AppError> {
    let filter = match query.status.as_deref() {
        None => None,
        Some(raw) => Some(
            EscrowStatus::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown status '{raw}'")))?,
        ),
    };
    let escrows: Vec<EscrowView> = state
        .ledger
        .list_escrows(filter)
        .into_iter()
        .map(EscrowView::from)
        .collect();
    Ok(Json(ListEscrowsResponse {
        count: escrows.len(),
        escrows,
    }))
}

/// GET /v1/escrows/:id/history: Committed operations on one escrow.
#[utoipa::path(
    get,
    path = "/v1/escrows/{id}/history",
    params(("id" = u64, Path, description = "Escrow id")),
    responses(
        (status = 200, description = "Audit history", body = HistoryResponse),
        (status = 404, description = "Unknown escrow", body = ErrorBody),
    ),
    tag = "escrows"
)]
pub(crate) async fn escrow_history(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<HistoryResponse>, AppError> {
    let id = escrow_id(path)?;
    if state.ledger.get_escrow(id).is_none() {
        return Err(AppError::NotFound(format!("{id} not found")));
    }
    let events = state
        .ledger
        .history(id)
        .into_iter()
        .map(EventView::from)
        .collect();
    Ok(Json(HistoryResponse {
        id: id.get(),
        events,
    }))
}
