//! DealBridge Backend Library
//!
//! Broker/lender deal marketplace: criteria matching, the deal lifecycle,
//! deal-scoped access control, messaging and an encrypted document vault.

pub mod access;
pub mod auth;
pub mod config;
pub mod db;
pub mod deal;
pub mod error;
pub mod handlers;
pub mod matching;
pub mod messaging;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod routes;
pub mod state;
pub mod store;
pub mod vault;

use axum::{routing::get, Router};

use state::AppState;

/// API router with request tracing and security headers.
/// CORS and HSTS are environment-specific and added by the binary.
pub fn app(state: AppState) -> Router {
    let upload_limit = state.document_vault.request_body_limit();

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(routes::auth_routes())
        .merge(routes::lender_routes())
        .merge(routes::broker_routes())
        .merge(routes::deal_routes(upload_limit))
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
}
