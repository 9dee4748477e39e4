//! Authentication module for DealBridge
//!
//! Email/password accounts with opaque bearer sessions.
//! - bcrypt password hashing
//! - random session tokens, stored hashed, with expiry and revocation

mod password;
mod service;
mod token;

pub use password::{hash_password, verify_password};
pub use service::AuthService;
pub use token::{generate_session_token, hash_token};
