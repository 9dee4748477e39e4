//! Lender criteria models

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Lender criteria, one record per lender
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct LenderCriteria {
    pub lender_id: Uuid,
    pub loan_types: Vec<String>,
    pub min_amount: f64,
    pub max_amount: f64,
    pub regions: Vec<String>,
    pub credit_score_min: i32,
    pub ltv_max: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LenderCriteria {
    pub fn from_request(lender_id: Uuid, request: CriteriaRequest) -> Self {
        let now = Utc::now();
        Self {
            lender_id,
            loan_types: request.loan_types,
            min_amount: request.min_amount,
            max_amount: request.max_amount,
            regions: request.regions,
            credit_score_min: request.credit_score_min,
            ltv_max: request.ltv_max,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request DTO for setting criteria. Replaces any previous record.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[validate(schema(function = "validate_amount_range"))]
pub struct CriteriaRequest {
    #[validate(length(min = 1, message = "at least one loan type is required"))]
    pub loan_types: Vec<String>,
    #[validate(range(min = 0.0))]
    pub min_amount: f64,
    #[validate(range(min = 0.0))]
    pub max_amount: f64,
    #[validate(length(min = 1, message = "at least one region is required"))]
    pub regions: Vec<String>,
    #[validate(range(min = 300, max = 850))]
    pub credit_score_min: i32,
    #[validate(range(min = 0.0, max = 2.0))]
    pub ltv_max: f64,
}

fn validate_amount_range(req: &CriteriaRequest) -> Result<(), ValidationError> {
    if req.min_amount > req.max_amount {
        return Err(ValidationError::new("min_amount_exceeds_max_amount"));
    }
    Ok(())
}
