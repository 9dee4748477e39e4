//! In-memory store for development and tests

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::deal::{Deal, DealStatus, LenderInterest};
use crate::matching::{self, LenderCriteria};
use crate::messaging::Message;
use crate::models::{Session, User};
use crate::vault::{DocumentMetadata, StoredDocument};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, Session>,
    criteria: HashMap<Uuid, LenderCriteria>,
    deals: HashMap<Uuid, Deal>,
    interests: Vec<LenderInterest>,
    documents: Vec<StoredDocument>,
    messages: Vec<Message>,
}

/// Store backed by process memory. All tables sit behind one lock, so
/// conditional updates are atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn take_limit<T>(items: impl Iterator<Item = T>, limit: i64) -> Vec<T> {
    items.take(limit.max(0) as usize).collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_session(&self, session: &Session) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_session_by_token_hash(&self, token_hash: &str) -> StoreResult<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .values()
            .find(|s| s.token_hash == token_hash)
            .cloned())
    }

    async fn revoke_session(&self, session_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.sessions.get_mut(&session_id) {
            Some(session) if !session.revoked => {
                session.revoked = true;
                session.revoked_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_user_sessions(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut revoked = 0;
        for session in tables
            .sessions
            .values_mut()
            .filter(|s| s.user_id == user_id && !s.revoked)
        {
            session.revoked = true;
            session.revoked_at = Some(now);
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn upsert_criteria(&self, criteria: &LenderCriteria) -> StoreResult<LenderCriteria> {
        let mut tables = self.tables.write().await;
        let mut stored = criteria.clone();
        if let Some(existing) = tables.criteria.get(&criteria.lender_id) {
            stored.created_at = existing.created_at;
        }
        tables.criteria.insert(stored.lender_id, stored.clone());
        Ok(stored)
    }

    async fn find_criteria(&self, lender_id: Uuid) -> StoreResult<Option<LenderCriteria>> {
        Ok(self.tables.read().await.criteria.get(&lender_id).cloned())
    }

    async fn list_criteria(&self) -> StoreResult<Vec<LenderCriteria>> {
        Ok(self.tables.read().await.criteria.values().cloned().collect())
    }

    async fn insert_deal(&self, deal: &Deal) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.deals.insert(deal.id, deal.clone());
        Ok(())
    }

    async fn find_deal(&self, id: Uuid) -> StoreResult<Option<Deal>> {
        Ok(self.tables.read().await.deals.get(&id).cloned())
    }

    async fn list_deals_by_broker(&self, broker_id: Uuid, limit: i64) -> StoreResult<Vec<Deal>> {
        let tables = self.tables.read().await;
        let mut deals: Vec<Deal> = tables
            .deals
            .values()
            .filter(|d| d.broker_id == broker_id)
            .cloned()
            .collect();
        deals.sort_by_key(|d| d.created_at);
        Ok(take_limit(deals.into_iter(), limit))
    }

    async fn list_matching_pending_deals(
        &self,
        criteria: &LenderCriteria,
        limit: i64,
    ) -> StoreResult<Vec<Deal>> {
        let tables = self.tables.read().await;
        let mut pending: Vec<Deal> = tables
            .deals
            .values()
            .filter(|d| d.status == DealStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|d| d.created_at);
        Ok(take_limit(
            matching::matching_deals(criteria, pending).into_iter(),
            limit,
        ))
    }

    async fn assign_lender(
        &self,
        deal_id: Uuid,
        broker_id: Uuid,
        lender_id: Uuid,
    ) -> StoreResult<Option<Deal>> {
        let mut tables = self.tables.write().await;
        match tables.deals.get_mut(&deal_id) {
            Some(deal)
                if deal.broker_id == broker_id
                    && deal.status == DealStatus::Pending
                    && deal.selected_lender.is_none() =>
            {
                deal.selected_lender = Some(lender_id);
                deal.status = DealStatus::InProgress;
                deal.updated_at = Utc::now();
                Ok(Some(deal.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn mark_completed(&self, deal_id: Uuid) -> StoreResult<Option<Deal>> {
        let mut tables = self.tables.write().await;
        match tables.deals.get_mut(&deal_id) {
            Some(deal)
                if matches!(deal.status, DealStatus::InProgress | DealStatus::Completed) =>
            {
                deal.status = DealStatus::Completed;
                deal.updated_at = Utc::now();
                Ok(Some(deal.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn record_interest(&self, interest: &LenderInterest) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(deal) = tables.deals.get_mut(&interest.deal_id) else {
            return Ok(false);
        };
        if !deal.matched_lenders.contains(&interest.lender_id) {
            deal.matched_lenders.push(interest.lender_id);
            deal.updated_at = Utc::now();
        }
        tables.interests.push(interest.clone());
        Ok(true)
    }

    async fn list_interests(&self, deal_id: Uuid, limit: i64) -> StoreResult<Vec<LenderInterest>> {
        let tables = self.tables.read().await;
        Ok(take_limit(
            tables
                .interests
                .iter()
                .filter(|i| i.deal_id == deal_id)
                .cloned(),
            limit,
        ))
    }

    async fn insert_document(&self, document: &StoredDocument) -> StoreResult<()> {
        self.tables.write().await.documents.push(document.clone());
        Ok(())
    }

    async fn find_document(&self, id: Uuid) -> StoreResult<Option<StoredDocument>> {
        let tables = self.tables.read().await;
        Ok(tables.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn list_documents(
        &self,
        deal_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<DocumentMetadata>> {
        let tables = self.tables.read().await;
        Ok(take_limit(
            tables
                .documents
                .iter()
                .filter(|d| d.deal_id == deal_id)
                .map(DocumentMetadata::from),
            limit,
        ))
    }

    async fn insert_message(&self, message: &Message) -> StoreResult<()> {
        self.tables.write().await.messages.push(message.clone());
        Ok(())
    }

    async fn list_messages(&self, deal_id: Uuid, limit: i64) -> StoreResult<Vec<Message>> {
        let tables = self.tables.read().await;
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.deal_id == deal_id)
            .cloned()
            .collect();
        // stable: equal timestamps keep insertion order
        messages.sort_by_key(|m| m.timestamp);
        Ok(take_limit(messages.into_iter(), limit))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
