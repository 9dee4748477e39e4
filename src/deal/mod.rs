//! Deal domain module
//!
//! Contains models and the lifecycle service for deals and lender interest.

mod model;
mod service;

pub use model::*;
pub use service::DealService;
