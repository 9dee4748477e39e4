//! Deal conversation log

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::access::{self, Action, Actor};
use crate::error::ApiResult;
use crate::messaging::Message;
use crate::store::{Store, PAGE_SIZE};

/// Append-only message log scoped to a deal
#[derive(Clone)]
pub struct MessageLog {
    store: Arc<dyn Store>,
}

impl MessageLog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Append a message from `actor`. Length is validated by the request type.
    pub async fn append(&self, actor: &Actor, deal_id: Uuid, text: String) -> ApiResult<Message> {
        access::load_authorized(self.store.as_ref(), actor, deal_id, Action::SendMessage).await?;

        let message = Message {
            id: Uuid::new_v4(),
            deal_id,
            sender_id: actor.id,
            sender_name: actor.name.clone(),
            sender_role: actor.role,
            message: text,
            timestamp: Utc::now(),
        };
        self.store.insert_message(&message).await?;

        tracing::debug!(deal_id = %deal_id, user_id = %actor.id, "Message appended");
        Ok(message)
    }

    /// Messages oldest first, capped at one page
    pub async fn list(&self, actor: &Actor, deal_id: Uuid) -> ApiResult<Vec<Message>> {
        access::load_authorized(self.store.as_ref(), actor, deal_id, Action::ReadMessages).await?;
        Ok(self.store.list_messages(deal_id, PAGE_SIZE).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::{CreateDealRequest, Deal};
    use crate::error::ApiError;
    use crate::models::UserRole;
    use crate::store::MemoryStore;

    async fn setup() -> (MessageLog, Arc<MemoryStore>, Actor, Deal) {
        let store = Arc::new(MemoryStore::new());
        let broker = Actor::new(Uuid::new_v4(), UserRole::Broker, "Bree");
        let deal = Deal::new(
            broker.id,
            broker.name.clone(),
            CreateDealRequest {
                title: "Warehouse".to_string(),
                loan_type: "commercial".to_string(),
                amount: 900_000.0,
                region: "TX".to_string(),
                borrower_credit_score: 710,
                ltv_ratio: 0.6,
                property_type: "industrial".to_string(),
                description: String::new(),
            },
        );
        store.insert_deal(&deal).await.unwrap();
        (MessageLog::new(store.clone()), store, broker, deal)
    }

    #[tokio::test]
    async fn test_messages_are_listed_oldest_first() {
        let (log, _, broker, deal) = setup().await;
        for text in ["first", "second", "third"] {
            log.append(&broker, deal.id, text.to_string()).await.unwrap();
        }

        let messages = log.list(&broker, deal.id).await.unwrap();
        let texts: Vec<&str> = messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert!(messages.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(messages[0].sender_name, "Bree");
        assert_eq!(messages[0].sender_role, UserRole::Broker);
    }

    #[tokio::test]
    async fn test_selected_lender_joins_the_conversation() {
        let (log, store, broker, deal) = setup().await;
        let lender = Actor::new(Uuid::new_v4(), UserRole::Lender, "Lars");

        assert!(matches!(
            log.append(&lender, deal.id, "hello".to_string()).await,
            Err(ApiError::AccessDenied(_))
        ));

        store
            .assign_lender(deal.id, broker.id, lender.id)
            .await
            .unwrap()
            .unwrap();

        log.append(&lender, deal.id, "hello".to_string()).await.unwrap();
        assert_eq!(log.list(&broker, deal.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_deal() {
        let (log, _, broker, _) = setup().await;
        assert!(matches!(
            log.list(&broker, Uuid::new_v4()).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
