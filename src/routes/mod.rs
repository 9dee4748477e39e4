//! Route definitions for the DealBridge API

mod auth;
mod broker;
mod deals;
mod lender;

pub use auth::auth_routes;
pub use broker::broker_routes;
pub use deals::deal_routes;
pub use lender::lender_routes;
