//! Encrypted document vault
//!
//! Documents are sealed with the active key before they reach the store.
//! Only metadata is ever returned over HTTP.

mod cipher;
mod model;
mod service;

pub use cipher::{DocumentCipher, Sealed, VaultError, NONCE_SIZE};
pub use model::*;
pub use service::DocumentVault;
