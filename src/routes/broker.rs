//! Broker route definitions

use axum::{routing::post, Router};

use crate::handlers::broker;
use crate::state::AppState;

pub fn broker_routes() -> Router<AppState> {
    Router::new().route(
        "/broker/deals",
        post(broker::create_deal).get(broker::list_deals),
    )
}
