//! Per-deal messaging between the broker and the selected lender

mod model;
mod service;

pub use model::*;
pub use service::MessageLog;
