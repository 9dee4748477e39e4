//! Deal-scoped route definitions

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::handlers::deals;
use crate::state::AppState;

/// `upload_limit` caps request bodies on the documents route, which carry
/// whole files; every other route keeps the default limit
pub fn deal_routes(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/deals/:id/interests", get(deals::list_interests))
        .route("/deals/:id/select-lender", post(deals::select_lender))
        .route(
            "/deals/:id/messages",
            post(deals::send_message).get(deals::list_messages),
        )
        .route(
            "/deals/:id/documents",
            post(deals::upload_document)
                .get(deals::list_documents)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/deals/:id/complete", post(deals::complete_deal))
}
