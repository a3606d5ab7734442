//! # escrow-api: HTTP Surface for the Escrow Ledger
//!
//! ## API Surface
//!
//! | Prefix | Module | Domain |
//! |---|---|---|
//! | `/v1/escrows/*` | [`routes::escrows`] | Escrow lifecycle and audit history |
//! | `/v1/owner`, `/v1/treasury` | [`routes::accounts`] | Configured accounts |
//! | `/v1/fees/*` | [`routes::accounts`] | Fee preview |
//! | `/v1/accounts/*` | [`routes::accounts`] | Bank balances |
//!
//! Mutating endpoints identify the caller through the `X-Caller-Account`
//! header (see [`auth`]). Health probes and `/openapi.json` need no caller.

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::escrows::router())
        .merge(routes::accounts::router())
        .merge(openapi::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: the ledger is built before the listener binds.
async fn readiness() -> &'static str {
    "ready"
}
