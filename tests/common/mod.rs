//! Shared helpers for router-level tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use dealbridge_server::config::Config;
use dealbridge_server::state::AppState;
use dealbridge_server::store::MemoryStore;

/// Router over a fresh in-memory store with a cheap bcrypt cost
pub fn test_app() -> Router {
    let config = Config {
        bcrypt_cost: 4,
        ..Config::default()
    };
    let state = AppState::from_config(Arc::new(MemoryStore::new()), &config)
        .expect("ephemeral vault key");
    dealbridge_server::app(state)
}

pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    call(app, Method::GET, uri, Some(token), None).await
}

pub async fn post(app: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    call(app, Method::POST, uri, Some(token), Some(body)).await
}

/// Register and log in, returning (user id, session token)
pub async fn sign_up(app: &Router, email: &str, role: &str) -> (String, String) {
    let (status, _) = call(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "correct horse battery",
            "name": email.split('@').next().unwrap_or(email),
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register {}", email);

    let (status, body) = call(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({
            "email": email,
            "password": "correct horse battery",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login {}", email);

    (
        body["user"]["id"].as_str().unwrap().to_string(),
        body["session_token"].as_str().unwrap().to_string(),
    )
}

pub fn residential_criteria() -> Value {
    json!({
        "loan_types": ["residential"],
        "min_amount": 100000.0,
        "max_amount": 500000.0,
        "regions": ["CA"],
        "credit_score_min": 650,
        "ltv_max": 0.8,
    })
}

pub fn residential_deal() -> Value {
    json!({
        "title": "Starter home in Sacramento",
        "loan_type": "residential",
        "amount": 250000.0,
        "region": "CA",
        "borrower_credit_score": 700,
        "ltv_ratio": 0.7,
        "property_type": "single_family",
        "description": "First-time buyer, W2 income",
    })
}

/// Broker creates the standard deal; returns its id
pub async fn create_deal(app: &Router, broker_token: &str) -> String {
    let (status, deal) = post(app, "/broker/deals", broker_token, residential_deal()).await;
    assert_eq!(status, StatusCode::OK);
    deal["id"].as_str().unwrap().to_string()
}

pub async fn express_interest(app: &Router, lender_token: &str, deal_id: &str) -> StatusCode {
    post(
        app,
        "/lender/interest",
        lender_token,
        json!({
            "deal_id": deal_id,
            "interest_type": "full",
            "message": "We can fund this",
        }),
    )
    .await
    .0
}
