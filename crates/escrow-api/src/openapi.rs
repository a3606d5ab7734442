//! # OpenAPI Document Assembly
//!
//! Collects every utoipa-documented handler into one OpenAPI document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Escrow Ledger API",
        version = "0.1.0",
        description = "Custodial escrow: lock a payer's funds, release them to the payee less a treasury fee, or refund the payer.",
        license(name = "BUSL-1.1")
    ),
    paths(
        // Escrows
        crate::routes::escrows::create_escrow,
        crate::routes::escrows::release_funds,
        crate::routes::escrows::cancel_escrow,
        crate::routes::escrows::get_escrow,
        crate::routes::escrows::list_escrows,
        crate::routes::escrows::escrow_history,
        // Accounts & fees
        crate::routes::accounts::get_owner,
        crate::routes::accounts::get_treasury,
        crate::routes::accounts::preview_fee,
        crate::routes::accounts::get_balance,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::escrows::CreateEscrowRequest,
        crate::routes::escrows::CreateEscrowResponse,
        crate::routes::escrows::ReleaseResponse,
        crate::routes::escrows::CancelResponse,
        crate::routes::escrows::EscrowView,
        crate::routes::escrows::GetEscrowResponse,
        crate::routes::escrows::ListEscrowsResponse,
        crate::routes::escrows::MovementView,
        crate::routes::escrows::EventView,
        crate::routes::escrows::HistoryResponse,
        crate::routes::accounts::AccountResponse,
        crate::routes::accounts::FeeResponse,
        crate::routes::accounts::BalanceResponse,
    )),
    tags(
        (name = "escrows", description = "Escrow lifecycle"),
        (name = "accounts", description = "Configured accounts, fee preview and balances"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON document at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
