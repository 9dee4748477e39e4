//! Middleware for the DealBridge API
//!
//! Request tracing, security headers, and the request extractors.

pub mod auth;
mod deal_path;
mod security;
mod tracing;
mod validated;

pub use auth::{AuthenticatedUser, BrokerUser, LenderUser};
pub use deal_path::DealId;
pub use security::{hsts_header, security_headers};
pub use tracing::{request_tracing, REQUEST_ID_HEADER};
pub use validated::ValidatedJson;
