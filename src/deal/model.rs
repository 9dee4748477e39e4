//! Deal models and data structures for DealBridge

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Deal model, the aggregate root of the broker/lender workflow
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Deal {
    pub id: Uuid,
    pub broker_id: Uuid,
    pub broker_name: String,
    pub title: String,
    pub loan_type: String,
    pub amount: f64,
    pub region: String,
    pub borrower_credit_score: i32,
    pub ltv_ratio: f64,
    pub property_type: String,
    pub description: String,
    pub status: DealStatus,
    /// Lenders that expressed interest. Grows only.
    pub matched_lenders: Vec<Uuid>,
    /// Set once on selection
    pub selected_lender: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deal {
    /// Build a fresh pending deal owned by `broker_id`
    pub fn new(broker_id: Uuid, broker_name: String, request: CreateDealRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            broker_id,
            broker_name,
            title: request.title,
            loan_type: request.loan_type,
            amount: request.amount,
            region: request.region,
            borrower_credit_score: request.borrower_credit_score,
            ltv_ratio: request.ltv_ratio,
            property_type: request.property_type,
            description: request.description,
            status: DealStatus::Pending,
            matched_lenders: Vec::new(),
            selected_lender: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.broker_id == user_id
    }

    pub fn is_selected_lender(&self, user_id: Uuid) -> bool {
        self.selected_lender == Some(user_id)
    }

    pub fn has_interest_from(&self, lender_id: Uuid) -> bool {
        self.matched_lenders.contains(&lender_id)
    }
}

/// Deal lifecycle status: pending -> in_progress -> completed
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "deal_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Pending,
    InProgress,
    Completed,
}

impl DealStatus {
    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// `Completed -> Completed` is accepted so repeated completion calls
    /// are harmless.
    pub fn can_transition_to(self, next: DealStatus) -> bool {
        matches!(
            (self, next),
            (DealStatus::Pending, DealStatus::InProgress)
                | (DealStatus::InProgress, DealStatus::Completed)
                | (DealStatus::Completed, DealStatus::Completed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStatus::Pending => "pending",
            DealStatus::InProgress => "in_progress",
            DealStatus::Completed => "completed",
        }
    }
}

/// Request DTO for creating a deal
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateDealRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 64))]
    pub loan_type: String,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    #[validate(length(min = 1, max = 64))]
    pub region: String,
    #[validate(range(min = 300, max = 850))]
    pub borrower_credit_score: i32,
    #[validate(range(min = 0.0, max = 2.0))]
    pub ltv_ratio: f64,
    #[validate(length(min = 1, max = 64))]
    pub property_type: String,
    #[validate(length(max = 5000))]
    pub description: String,
}

/// Lender interest in a deal. Append-only.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct LenderInterest {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub lender_id: Uuid,
    pub lender_name: String,
    pub interest_type: InterestType,
    /// Amount offered, present for partial interest
    pub amount: Option<f64>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Full or partial funding offer
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "interest_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InterestType {
    Full,
    Partial,
}

/// Request DTO for expressing interest
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[validate(schema(function = "validate_partial_amount"))]
pub struct ExpressInterestRequest {
    pub deal_id: Uuid,
    pub interest_type: InterestType,
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub message: String,
}

fn validate_partial_amount(req: &ExpressInterestRequest) -> Result<(), ValidationError> {
    if req.interest_type == InterestType::Partial && req.amount.is_none() {
        return Err(ValidationError::new("partial_interest_requires_amount"));
    }
    Ok(())
}

/// Request DTO for selecting a lender
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SelectLenderRequest {
    pub lender_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use DealStatus::*;

        assert!(Pending.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Completed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!InProgress.can_transition_to(Pending));
        assert!(!InProgress.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(Pending));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(DealStatus::InProgress).unwrap(),
            "in_progress"
        );
        assert_eq!(DealStatus::InProgress.as_str(), "in_progress");
    }

    #[test]
    fn test_partial_interest_requires_amount() {
        let mut req = ExpressInterestRequest {
            deal_id: Uuid::new_v4(),
            interest_type: InterestType::Partial,
            amount: None,
            message: "Can fund half".to_string(),
        };
        assert!(req.validate().is_err());

        req.amount = Some(125_000.0);
        assert!(req.validate().is_ok());

        req.interest_type = InterestType::Full;
        req.amount = None;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_deal_request_rejects_out_of_range_credit_score() {
        let req = CreateDealRequest {
            title: "Bridge loan".to_string(),
            loan_type: "residential".to_string(),
            amount: 250_000.0,
            region: "CA".to_string(),
            borrower_credit_score: 900,
            ltv_ratio: 0.7,
            property_type: "single_family".to_string(),
            description: String::new(),
        };
        assert!(req.validate().is_err());
    }
}
