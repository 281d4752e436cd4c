//! API Integration Tests

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    middleware, Router,
};
use serde_json::Value;
use tower::util::ServiceExt;

use ledgerd::api::routes::{CreateAccountRequest, CreateTransferRequest, CreateUserRequest};
use ledgerd::{api, Currency, Store};

mod common;

macro_rules! require_db {
    () => {
        match common::try_setup().await {
            Some(store) => store,
            None => {
                eprintln!("skipping: DATABASE_URL not set");
                return;
            }
        }
    };
}

fn test_app(store: Store) -> Router {
    api::create_router()
        .layer(middleware::from_fn(api::middleware::context_middleware))
        .with_state(store)
}

async fn post_json(app: &Router, uri: &str, body: String) -> axum::response::Response {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_account_api_e2e() {
    let store = require_db!();
    let app = test_app(store);

    // Create
    let owner = common::random_owner();
    let response = post_json(
        &app,
        "/accounts",
        serde_json::to_string(&CreateAccountRequest {
            owner: owner.clone(),
            currency: "USD".to_string(),
        })
        .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["owner"], owner.as_str());
    assert_eq!(created["balance"], 0);
    assert_eq!(created["currency"], "USD");
    let id = created["id"].as_i64().unwrap();

    // Read back
    let response = get(&app, &format!("/accounts/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["id"], id);
    assert_eq!(fetched["owner"], owner.as_str());

    // Unknown id
    let response = get(&app, "/accounts/0").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error_code"], "account_not_found");

    // Unsupported currency
    let response = post_json(
        &app,
        "/accounts",
        serde_json::to_string(&CreateAccountRequest {
            owner: common::random_owner(),
            currency: "JPY".to_string(),
        })
        .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_code"], "unsupported_currency");
}

#[tokio::test]
async fn test_list_accounts_pagination_bounds() {
    let store = require_db!();
    let app = test_app(store.clone());

    for _ in 0..5 {
        common::create_random_account(&store).await;
    }

    let response = get(&app, "/accounts?page_id=1&page_size=5").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 5);

    // page_size outside 5..=10 is rejected
    let response = get(&app, "/accounts?page_id=1&page_size=11").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/accounts?page_id=0&page_size=5").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transfer_api_e2e() {
    let store = require_db!();
    let app = test_app(store.clone());

    let account1 = common::create_account_with_balance(&store, 1000, Currency::Eur).await;
    let account2 = common::create_account_with_balance(&store, 500, Currency::Eur).await;

    let response = post_json(
        &app,
        "/transfers",
        serde_json::to_string(&CreateTransferRequest {
            from_account_id: account1.id,
            to_account_id: account2.id,
            amount: 100,
            currency: "EUR".to_string(),
        })
        .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let result = body_json(response).await;
    assert_eq!(result["transfer"]["amount"], 100);
    assert_eq!(result["from_account"]["balance"], 900);
    assert_eq!(result["to_account"]["balance"], 600);
    assert_eq!(result["from_entry"]["amount"], -100);
    assert_eq!(result["to_entry"]["amount"], 100);

    // The transfer is readable afterwards
    let transfer_id = result["transfer"]["id"].as_i64().unwrap();
    let response = get(&app, &format!("/transfers/{}", transfer_id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Entries show up on the account
    let response = get(
        &app,
        &format!("/accounts/{}/entries?page_id=1&page_size=5", account1.id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let entries = body_json(response).await;
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["amount"], -100);
}

#[tokio::test]
async fn test_transfer_api_validation() {
    let store = require_db!();
    let app = test_app(store.clone());

    let usd_account = common::create_account_with_balance(&store, 1000, Currency::Usd).await;
    let eur_account = common::create_account_with_balance(&store, 1000, Currency::Eur).await;

    // Currency must match both accounts
    let response = post_json(
        &app,
        "/transfers",
        serde_json::to_string(&CreateTransferRequest {
            from_account_id: usd_account.id,
            to_account_id: eur_account.id,
            amount: 10,
            currency: "USD".to_string(),
        })
        .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_code"], "currency_mismatch");

    // Missing account
    let response = post_json(
        &app,
        "/transfers",
        serde_json::to_string(&CreateTransferRequest {
            from_account_id: usd_account.id,
            to_account_id: 0,
            amount: 10,
            currency: "USD".to_string(),
        })
        .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Non-positive amount
    let response = post_json(
        &app,
        "/transfers",
        serde_json::to_string(&CreateTransferRequest {
            from_account_id: usd_account.id,
            to_account_id: usd_account.id,
            amount: 0,
            currency: "USD".to_string(),
        })
        .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_self_transfer_api_nets_to_zero() {
    let store = require_db!();
    let app = test_app(store.clone());

    let account = common::create_account_with_balance(&store, 200, Currency::Rmb).await;

    // Pinned behavior: accepted, balance unchanged
    let response = post_json(
        &app,
        "/transfers",
        serde_json::to_string(&CreateTransferRequest {
            from_account_id: account.id,
            to_account_id: account.id,
            amount: 50,
            currency: "RMB".to_string(),
        })
        .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let result = body_json(response).await;
    assert_eq!(result["from_account"]["balance"], 200);
    assert_eq!(result["to_account"]["balance"], 200);

    let updated = store.get_account(account.id).await.unwrap();
    assert_eq!(updated.balance, 200);
}

#[tokio::test]
async fn test_user_api() {
    let store = require_db!();
    let app = test_app(store);

    let username = common::random_string(8);
    let request = CreateUserRequest {
        username: username.clone(),
        password: "secret123".to_string(),
        full_name: "Alice Example".to_string(),
        email: common::random_email(),
    };

    // Create: hashed password never leaves the server
    let response = post_json(&app, "/users", serde_json::to_string(&request).unwrap()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["username"], username.as_str());
    assert!(body.get("hashed_password").is_none());
    assert!(body.get("password").is_none());

    // Duplicate username
    let mut dup = CreateUserRequest {
        username,
        password: "secret123".to_string(),
        full_name: "Alice Example".to_string(),
        email: common::random_email(),
    };
    let response = post_json(&app, "/users", serde_json::to_string(&dup).unwrap()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Short password
    dup.username = common::random_string(8);
    dup.password = "short".to_string();
    let response = post_json(&app, "/users", serde_json::to_string(&dup).unwrap()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
