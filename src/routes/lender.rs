//! Lender route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::lender;
use crate::state::AppState;

pub fn lender_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/lender/criteria",
            post(lender::set_criteria).get(lender::get_criteria),
        )
        .route("/lender/deals", get(lender::available_deals))
        .route("/lender/interest", post(lender::express_interest))
}
