//! End-to-end tests of the HTTP API against the in-memory store.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use money_transfer_service::{
    app, services::ledger_service::LedgerService, store::memory::MemoryAccountStore,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const USER_EMAIL: &str = "test%40mail.com";
const USERNAME: &str = "testUser";

fn test_app() -> Router {
    app(LedgerService::new(Arc::new(MemoryAccountStore::new())))
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create_account(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        &format!("/account/create?email={USER_EMAIL}&username={USERNAME}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["accountId"].as_str().unwrap().to_string()
}

async fn create_funded_account(app: &Router, amount: &str) -> String {
    let id = create_account(app).await;
    let (status, _) = send(
        app,
        Method::PUT,
        &format!("/account/deposit?amount={amount}&accountId={id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    id
}

async fn balance(app: &Router, id: &str) -> String {
    let (status, body) = send(app, Method::GET, &format!("/account/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    body["balance"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn create_account_returns_zero_balance_and_user() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/account/create?email={USER_EMAIL}&username={USERNAME}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "0");
    assert_eq!(body["user"]["username"], USERNAME);
    assert_eq!(body["user"]["email"], "test@mail.com");
    assert!(body["accountId"].is_string());
    assert!(body["user"]["userId"].is_string());
}

#[tokio::test]
async fn create_account_with_invalid_email_is_rejected() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/account/create?email=not-an-email&username=testUser",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["reason"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["status"], 400);
}

#[tokio::test]
async fn missing_parameters_are_a_json_400() {
    let app = test_app();

    let (status, body) = send(&app, Method::PUT, "/account/deposit?amount=10").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["reason"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unparsable_amount_is_a_json_400() {
    let app = test_app();
    let id = create_account(&app).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/account/deposit?amount=ten&accountId={id}"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["reason"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn withdraw_with_insufficient_balance_is_404() {
    let app = test_app();
    let id = create_funded_account(&app, "10.00").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/account/withdraw?amount=200&accountId={id}"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({
            "error": {
                "status": 404,
                "reason": "ACCOUNT_LIST_LIMIT_REACHED",
                "message": "There isn't enough balance: 200"
            }
        })
    );
    assert_eq!(balance(&app, &id).await, "10.00");
}

#[tokio::test]
async fn withdraw_whole_balance_returns_updated_account() {
    let app = test_app();
    let id = create_funded_account(&app, "10.00").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/account/withdraw?amount=10.00&accountId={id}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "0.00");
}

#[tokio::test]
async fn deposit_to_missing_account_is_404() {
    let app = test_app();
    let missing = "00000000-0000-4000-8000-000000000000";

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/account/deposit?amount=20.00&accountId={missing}"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["reason"], "GENERAL_EXCEPTION");
    assert_eq!(
        body["error"]["message"],
        format!("Account does not exist: {missing}")
    );
}

#[tokio::test]
async fn zero_amount_is_rejected() {
    let app = test_app();
    let id = create_account(&app).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/account/deposit?amount=0&accountId={id}"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transfer_moves_funds_between_accounts() {
    let app = test_app();
    let from = create_funded_account(&app, "101.00").await;
    let to = create_account(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/account/transfer?amount=10.00&fromAccount={from}&toAccount={to}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
    assert_eq!(balance(&app, &from).await, "91.00");
    assert_eq!(balance(&app, &to).await, "10.00");
}

#[tokio::test]
async fn transfer_with_insufficient_balance_leaves_destination_untouched() {
    let app = test_app();
    let from = create_account(&app).await;
    let to = create_funded_account(&app, "3.50").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/account/transfer?amount=10&fromAccount={from}&toAccount={to}"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "There isn't enough balance: 10");
    assert_eq!(balance(&app, &from).await, "0");
    assert_eq!(balance(&app, &to).await, "3.50");
}

#[tokio::test]
async fn transfer_to_same_account_is_rejected() {
    let app = test_app();
    let id = create_funded_account(&app, "5").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/account/transfer?amount=1&fromAccount={id}&toAccount={id}"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Cannot transfer to same account");
    assert_eq!(balance(&app, &id).await, "5");
}

#[tokio::test]
async fn unknown_account_lookup_is_404() {
    let app = test_app();

    let (status, _) = send(
        &app,
        Method::GET,
        "/account/00000000-0000-4000-8000-000000000000",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_account_id_in_path_is_a_json_400() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/account/not-a-uuid").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["reason"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["status"], 400);
}

#[tokio::test]
async fn deposit_past_the_representable_balance_is_a_json_400() {
    let app = test_app();
    let id = create_funded_account(&app, "79228162514264337593543950335").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/account/deposit?amount=1&accountId={id}"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["reason"], "VALIDATION_ERROR");
    assert_eq!(balance(&app, &id).await, "79228162514264337593543950335");
}

#[tokio::test]
async fn health_reports_connected_store() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "connected");
}
