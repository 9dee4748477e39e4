//! Record storage for DealBridge
//!
//! Services talk to storage only through [`Store`]. Each method touches a
//! single record or appends a single row; there are no cross-record
//! transactions. Deal transitions are conditional updates so concurrent
//! writers cannot both win.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::deal::{Deal, DealStatus, LenderInterest};
use crate::matching::LenderCriteria;
use crate::messaging::Message;
use crate::models::{Session, User};
use crate::vault::{DocumentMetadata, StoredDocument};

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("{0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Upper bound on rows returned by a listing
pub const PAGE_SIZE: i64 = 100;

/// Persistence operations used by the services
#[async_trait]
pub trait Store: Send + Sync {
    // Users and sessions

    /// Fails with `DuplicateEmail` when the email is taken
    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn insert_session(&self, session: &Session) -> StoreResult<()>;
    async fn find_session_by_token_hash(&self, token_hash: &str) -> StoreResult<Option<Session>>;
    /// Returns false when the session was missing or already revoked
    async fn revoke_session(&self, session_id: Uuid) -> StoreResult<bool>;
    async fn revoke_user_sessions(&self, user_id: Uuid) -> StoreResult<u64>;

    // Criteria

    /// Insert or replace the lender's single record
    async fn upsert_criteria(&self, criteria: &LenderCriteria) -> StoreResult<LenderCriteria>;
    async fn find_criteria(&self, lender_id: Uuid) -> StoreResult<Option<LenderCriteria>>;
    async fn list_criteria(&self) -> StoreResult<Vec<LenderCriteria>>;

    // Deals

    async fn insert_deal(&self, deal: &Deal) -> StoreResult<()>;
    async fn find_deal(&self, id: Uuid) -> StoreResult<Option<Deal>>;
    async fn list_deals_by_broker(&self, broker_id: Uuid, limit: i64) -> StoreResult<Vec<Deal>>;
    /// Pending deals accepted by `criteria`, oldest first. The criteria
    /// filter applies before `limit`.
    async fn list_matching_pending_deals(
        &self,
        criteria: &LenderCriteria,
        limit: i64,
    ) -> StoreResult<Vec<Deal>>;
    /// Set `selected_lender` and move to in_progress, only while the deal is
    /// pending, has no selected lender and is owned by `broker_id`.
    /// `None` when the condition did not hold.
    async fn assign_lender(
        &self,
        deal_id: Uuid,
        broker_id: Uuid,
        lender_id: Uuid,
    ) -> StoreResult<Option<Deal>>;
    /// Move to completed, only from in_progress or completed.
    /// `None` when the condition did not hold.
    async fn mark_completed(&self, deal_id: Uuid) -> StoreResult<Option<Deal>>;

    // Child records

    /// Append the interest and set-union its lender into the deal's
    /// `matched_lenders`, as one write. False, with nothing written, when
    /// the deal is missing.
    async fn record_interest(&self, interest: &LenderInterest) -> StoreResult<bool>;
    async fn list_interests(&self, deal_id: Uuid, limit: i64) -> StoreResult<Vec<LenderInterest>>;
    async fn insert_document(&self, document: &StoredDocument) -> StoreResult<()>;
    async fn find_document(&self, id: Uuid) -> StoreResult<Option<StoredDocument>>;
    async fn list_documents(&self, deal_id: Uuid, limit: i64)
        -> StoreResult<Vec<DocumentMetadata>>;
    async fn insert_message(&self, message: &Message) -> StoreResult<()>;
    /// Oldest first
    async fn list_messages(&self, deal_id: Uuid, limit: i64) -> StoreResult<Vec<Message>>;

    /// Connectivity check for health reporting
    async fn ping(&self) -> StoreResult<()>;
}
