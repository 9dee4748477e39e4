//! Deal service layer - lifecycle, interest and lender selection

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::access::{self, Action, Actor};
use crate::deal::{
    CreateDealRequest, Deal, DealStatus, ExpressInterestRequest, LenderInterest,
};
use crate::error::{ApiError, ApiResult};
use crate::matching::{self, CriteriaRequest, LenderCriteria};
use crate::models::UserRole;
use crate::notify::Notifier;
use crate::store::{Store, PAGE_SIZE};

/// Deal service for managing the deal lifecycle
#[derive(Clone)]
pub struct DealService {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
}

impl DealService {
    /// Create a new deal service instance
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    // ===== Lender criteria =====

    /// Store the lender's criteria, replacing any previous record
    pub async fn set_criteria(
        &self,
        actor: &Actor,
        request: CriteriaRequest,
    ) -> ApiResult<LenderCriteria> {
        access::require_role(actor, UserRole::Lender)?;

        let criteria = LenderCriteria::from_request(actor.id, request);
        let stored = self.store.upsert_criteria(&criteria).await?;

        tracing::info!(lender_id = %actor.id, "Lender criteria saved");
        Ok(stored)
    }

    pub async fn get_criteria(&self, actor: &Actor) -> ApiResult<Option<LenderCriteria>> {
        access::require_role(actor, UserRole::Lender)?;
        Ok(self.store.find_criteria(actor.id).await?)
    }

    // ===== Deals =====

    /// Create a pending deal and notify the lenders whose criteria accept it
    pub async fn create_deal(&self, actor: &Actor, request: CreateDealRequest) -> ApiResult<Deal> {
        access::require_role(actor, UserRole::Broker)?;

        let deal = Deal::new(actor.id, actor.name.clone(), request);
        self.store.insert_deal(&deal).await?;

        tracing::info!(deal_id = %deal.id, broker_id = %actor.id, "Deal created");

        match self.store.list_criteria().await {
            Ok(all) => {
                let lenders = matching::matching_lenders(&deal, &all);
                self.notifier.deal_matched(&deal, &lenders).await;
            }
            // The deal is already stored; a failed fan-out only loses notifications
            Err(e) => {
                tracing::warn!(deal_id = %deal.id, error = %e, "Failed to load criteria for fan-out");
            }
        }

        Ok(deal)
    }

    /// The broker's own deals
    pub async fn list_broker_deals(&self, actor: &Actor) -> ApiResult<Vec<Deal>> {
        access::require_role(actor, UserRole::Broker)?;
        Ok(self.store.list_deals_by_broker(actor.id, PAGE_SIZE).await?)
    }

    /// Pending deals matching the lender's criteria. Empty without criteria.
    pub async fn available_deals(&self, actor: &Actor) -> ApiResult<Vec<Deal>> {
        access::require_role(actor, UserRole::Lender)?;

        let Some(criteria) = self.store.find_criteria(actor.id).await? else {
            return Ok(Vec::new());
        };

        Ok(self
            .store
            .list_matching_pending_deals(&criteria, PAGE_SIZE)
            .await?)
    }

    // ===== Interest =====

    /// Record a lender's interest. Does not change the deal status.
    pub async fn express_interest(
        &self,
        actor: &Actor,
        request: ExpressInterestRequest,
    ) -> ApiResult<LenderInterest> {
        access::require_role(actor, UserRole::Lender)?;
        access::load_authorized(
            self.store.as_ref(),
            actor,
            request.deal_id,
            Action::ExpressInterest,
        )
        .await?;

        let interest = LenderInterest {
            id: Uuid::new_v4(),
            deal_id: request.deal_id,
            lender_id: actor.id,
            lender_name: actor.name.clone(),
            interest_type: request.interest_type,
            amount: request.amount,
            message: request.message,
            created_at: Utc::now(),
        };
        // Interest row and matched_lenders change land together or not at all
        if !self.store.record_interest(&interest).await? {
            return Err(ApiError::deal_not_found());
        }

        tracing::info!(
            deal_id = %interest.deal_id,
            lender_id = %actor.id,
            interest_type = ?interest.interest_type,
            "Lender expressed interest"
        );
        Ok(interest)
    }

    /// Interests recorded on a deal, for its broker
    pub async fn list_interests(
        &self,
        actor: &Actor,
        deal_id: Uuid,
    ) -> ApiResult<Vec<LenderInterest>> {
        access::load_authorized(self.store.as_ref(), actor, deal_id, Action::ViewInterests)
            .await?;
        Ok(self.store.list_interests(deal_id, PAGE_SIZE).await?)
    }

    // ===== Transitions =====

    /// Select a lender that expressed interest and move the deal to in_progress
    pub async fn select_lender(
        &self,
        actor: &Actor,
        deal_id: Uuid,
        lender_id: Uuid,
    ) -> ApiResult<Deal> {
        let deal =
            access::load_authorized(self.store.as_ref(), actor, deal_id, Action::SelectLender)
                .await?;

        if !deal.has_interest_from(lender_id) {
            return Err(ApiError::InvalidInput(
                "lender has not expressed interest in this deal".to_string(),
            ));
        }

        if deal.selected_lender.is_some() || !deal.status.can_transition_to(DealStatus::InProgress)
        {
            return Err(ApiError::InvalidState(format!(
                "a lender can only be selected while the deal is pending (status: {})",
                deal.status.as_str()
            )));
        }

        // Conditional update: a concurrent selection makes this return None
        let updated = self
            .store
            .assign_lender(deal_id, actor.id, lender_id)
            .await?
            .ok_or_else(|| {
                ApiError::InvalidState("a lender has already been selected".to_string())
            })?;

        tracing::info!(deal_id = %deal_id, lender_id = %lender_id, "Lender selected");
        Ok(updated)
    }

    /// Mark the deal completed. Repeating the call on a completed deal is a no-op.
    pub async fn complete_deal(&self, actor: &Actor, deal_id: Uuid) -> ApiResult<Deal> {
        let deal =
            access::load_authorized(self.store.as_ref(), actor, deal_id, Action::Complete).await?;

        if !deal.status.can_transition_to(DealStatus::Completed) {
            return Err(ApiError::InvalidState(format!(
                "deal must be in progress to complete (status: {})",
                deal.status.as_str()
            )));
        }

        let updated = self
            .store
            .mark_completed(deal_id)
            .await?
            .ok_or_else(|| ApiError::InvalidState("deal is not in progress".to_string()))?;

        tracing::info!(deal_id = %deal_id, user_id = %actor.id, "Deal completed");
        Ok(updated)
    }
}
