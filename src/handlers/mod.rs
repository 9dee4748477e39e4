//! API handlers for the DealBridge backend

pub mod auth;
pub mod broker;
pub mod deals;
pub mod health;
pub mod lender;

// Re-export extractors from middleware for handler use
pub use crate::middleware::auth::{AuthenticatedUser, BrokerUser, LenderUser};
