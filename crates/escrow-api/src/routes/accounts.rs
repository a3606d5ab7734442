//! # Accounts & Fees API
//!
//! Read-only views of the ledger configuration, the fee preview, and
//! balances held by the reference bank.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use escrow_core::AccountId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// A configured ledger account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub account: String,
}

/// Fee preview for an amount.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeeResponse {
    pub amount: u64,
    /// Withheld for the treasury.
    pub fee: u64,
    /// Paid to the payee.
    pub payment: u64,
}

/// Balance of one account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    pub account: String,
    pub balance: u64,
}

/// Build the accounts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/owner", get(get_owner))
        .route("/v1/treasury", get(get_treasury))
        .route("/v1/fees/:amount", get(preview_fee))
        .route("/v1/accounts/:id/balance", get(get_balance))
}

/// GET /v1/owner: The administrator account.
#[utoipa::path(
    get,
    path = "/v1/owner",
    responses((status = 200, description = "Administrator", body = AccountResponse)),
    tag = "accounts"
)]
pub(crate) async fn get_owner(State(state): State<AppState>) -> Json<AccountResponse> {
    Json(AccountResponse {
        account: state.ledger.owner().to_string(),
    })
}

/// GET /v1/treasury: The account that receives release fees.
#[utoipa::path(
    get,
    path = "/v1/treasury",
    responses((status = 200, description = "Treasury", body = AccountResponse)),
    tag = "accounts"
)]
pub(crate) async fn get_treasury(State(state): State<AppState>) -> Json<AccountResponse> {
    Json(AccountResponse {
        account: state.ledger.treasury().to_string(),
    })
}

/// GET /v1/fees/:amount: Fee and payment a release of `amount` would produce.
#[utoipa::path(
    get,
    path = "/v1/fees/{amount}",
    params(("amount" = u64, Path, description = "Escrow amount")),
    responses(
        (status = 200, description = "Fee preview", body = FeeResponse),
        (status = 400, description = "Amount is not an unsigned integer", body = ErrorBody),
    ),
    tag = "accounts"
)]
pub(crate) async fn preview_fee(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<FeeResponse>, AppError> {
    let Path(amount) = path.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let split = state.ledger.fee_split(amount);
    Ok(Json(FeeResponse {
        amount,
        fee: split.fee,
        payment: split.payment,
    }))
}

/// GET /v1/accounts/:id/balance: Balance held by the bank.
#[utoipa::path(
    get,
    path = "/v1/accounts/{id}/balance",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Balance", body = BalanceResponse),
        (status = 422, description = "Malformed account id", body = ErrorBody),
    ),
    tag = "accounts"
)]
pub(crate) async fn get_balance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BalanceResponse>, AppError> {
    let account = AccountId::new(id)?;
    let balance = state.bank.balance_of(&account);
    Ok(Json(BalanceResponse {
        account: account.to_string(),
        balance,
    }))
}
