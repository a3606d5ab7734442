//! # Integration Tests for escrow-api
//!
//! Drives the full router with `oneshot` requests: health probes, the
//! escrow lifecycle, caller identity, error mapping, fee preview and the
//! OpenAPI document.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use escrow_api::state::{AppConfig, AppState};
use escrow_core::{AccountId, LedgerConfig};
use escrow_ledger::{InMemoryBank, ManualClock};

const ADMIN: &str = "deployer";
const W1: &str = "wallet_1";
const W2: &str = "wallet_2";

fn account(s: &str) -> AccountId {
    AccountId::new(s).unwrap()
}

fn test_state() -> AppState {
    let bank = Arc::new(InMemoryBank::with_balances([(account(W1), 100_000_000)]));
    let config = LedgerConfig::new(account(ADMIN), account("escrow.custody")).unwrap();
    AppState::new(
        AppConfig::default(),
        config,
        bank,
        Arc::new(ManualClock::starting_at(1)),
    )
}

fn test_app() -> axum::Router {
    escrow_api::app(test_state())
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_as(caller: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-caller-account", caller);
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn create(caller: &str, payee: &str, amount: u64) -> Request<Body> {
    post_as(
        caller,
        "/v1/escrows",
        Some(json!({ "payee": payee, "amount": amount })),
    )
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app().oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = test_app().oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Escrow Lifecycle ---------------------------------------------------------

#[tokio::test]
async fn test_create_then_get() {
    let app = test_app();
    let response = app.clone().oneshot(create(W1, W2, 1_000_000)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await, json!({ "id": 1 }));

    let response = app.oneshot(get("/v1/escrows/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["escrow"]["payer"], W1);
    assert_eq!(body["escrow"]["payee"], W2);
    assert_eq!(body["escrow"]["amount"], 1_000_000);
    assert_eq!(body["escrow"]["status"], "ACTIVE");
    assert_eq!(body["escrow"]["created_at"], 1);
}

#[tokio::test]
async fn test_get_unknown_escrow_is_null() {
    let response = test_app().oneshot(get("/v1/escrows/42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "escrow": null }));
}

#[tokio::test]
async fn test_release_pays_out() {
    let state = test_state();
    let app = escrow_api::app(state.clone());
    app.clone().oneshot(create(W1, W2, 1_000_000)).await.unwrap();

    let response = app
        .clone()
        .oneshot(post_as(ADMIN, "/v1/escrows/1/release", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "id": 1, "released": true })
    );

    let response = app
        .oneshot(get("/v1/accounts/wallet_2/balance"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["balance"], 950_000);
    assert_eq!(state.bank.balance_of(&account(ADMIN)), 50_000);
}

#[tokio::test]
async fn test_second_release_conflicts() {
    let app = test_app();
    app.clone().oneshot(create(W1, W2, 1_000)).await.unwrap();
    app.clone()
        .oneshot(post_as(ADMIN, "/v1/escrows/1/release", None))
        .await
        .unwrap();

    let response = app
        .oneshot(post_as(ADMIN, "/v1/escrows/1/release", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(body["error"]["details"]["ledger_code"], 103);
}

#[tokio::test]
async fn test_cancel_refunds() {
    let state = test_state();
    let app = escrow_api::app(state.clone());
    app.clone().oneshot(create(W1, W2, 5_000_000)).await.unwrap();

    let response = app
        .clone()
        .oneshot(post_as(ADMIN, "/v1/escrows/1/cancel", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "id": 1, "cancelled": true })
    );
    assert_eq!(state.bank.balance_of(&account(W1)), 100_000_000);

    let response = app
        .oneshot(post_as(ADMIN, "/v1/escrows/1/release", None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["error"]["details"]["ledger_code"], 103);
}

#[tokio::test]
async fn test_non_admin_release_is_forbidden() {
    let app = test_app();
    app.clone().oneshot(create(W1, W2, 1_000)).await.unwrap();
    let response = app
        .oneshot(post_as(W1, "/v1/escrows/1/release", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"]["details"]["ledger_code"], 100);
}

#[tokio::test]
async fn test_release_unknown_is_not_found() {
    let response = test_app()
        .oneshot(post_as(ADMIN, "/v1/escrows/7/release", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["details"]["ledger_code"], 101);
}

#[tokio::test]
async fn test_zero_amount_is_validation_error() {
    let response = test_app().oneshot(create(W1, W2, 0)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["ledger_code"], 105);
}

#[tokio::test]
async fn test_unfunded_create_is_payment_failed() {
    let response = test_app().oneshot(create(W2, W1, 10)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "PAYMENT_FAILED");
    assert_eq!(body["error"]["details"]["ledger_code"], 106);
}

// -- Caller Identity & Request Validation -------------------------------------

#[tokio::test]
async fn test_create_without_caller_is_unauthorized() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/escrows")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "payee": W2, "amount": 5 }).to_string()))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_payee_is_rejected() {
    let response = test_app().oneshot(create(W1, "not valid", 5)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let request = post_as(W1, "/v1/escrows", Some(json!({ "payee": W2 })));
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let response = test_app().oneshot(get("/v1/escrows/abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Listing & History --------------------------------------------------------

#[tokio::test]
async fn test_list_with_status_filter() {
    let app = test_app();
    for amount in [10, 20, 30] {
        app.clone().oneshot(create(W1, W2, amount)).await.unwrap();
    }
    app.clone()
        .oneshot(post_as(ADMIN, "/v1/escrows/2/cancel", None))
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/v1/escrows")).await.unwrap();
    assert_eq!(body_json(response).await["count"], 3);

    let response = app
        .clone()
        .oneshot(get("/v1/escrows?status=cancelled"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["escrows"][0]["id"], 2);

    let response = app.oneshot(get("/v1/escrows?status=bogus")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_history_lists_committed_events() {
    let app = test_app();
    app.clone().oneshot(create(W1, W2, 1_000)).await.unwrap();
    app.clone()
        .oneshot(post_as(W1, "/v1/escrows/1/release", None))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_as(ADMIN, "/v1/escrows/1/release", None))
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/v1/escrows/1/history")).await.unwrap();
    let body = body_json(response).await;
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["kind"], "created");
    assert_eq!(events[1]["kind"], "released");
    assert_eq!(events[1]["actor"], ADMIN);

    let response = app.oneshot(get("/v1/escrows/9/history")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Accounts & Fees ----------------------------------------------------------

#[tokio::test]
async fn test_owner_and_treasury() {
    let app = test_app();
    let response = app.clone().oneshot(get("/v1/owner")).await.unwrap();
    assert_eq!(body_json(response).await, json!({ "account": ADMIN }));
    let response = app.oneshot(get("/v1/treasury")).await.unwrap();
    assert_eq!(body_json(response).await, json!({ "account": ADMIN }));
}

#[tokio::test]
async fn test_fee_preview() {
    let response = test_app().oneshot(get("/v1/fees/1000000")).await.unwrap();
    assert_eq!(
        body_json(response).await,
        json!({ "amount": 1_000_000, "fee": 50_000, "payment": 950_000 })
    );

    let response = test_app().oneshot(get("/v1/fees/19")).await.unwrap();
    assert_eq!(
        body_json(response).await,
        json!({ "amount": 19, "fee": 0, "payment": 19 })
    );
}

#[tokio::test]
async fn test_fee_preview_rejects_negative() {
    let response = test_app().oneshot(get("/v1/fees/-5")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_lists_escrow_paths() {
    let response = test_app().oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/v1/escrows"));
    assert!(paths.contains_key("/v1/escrows/{id}/release"));
    assert!(paths.contains_key("/v1/fees/{amount}"));
}
