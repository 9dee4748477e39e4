//! Lender HTTP handlers

use axum::{extract::State, Json};

use super::LenderUser;
use crate::deal::{Deal, ExpressInterestRequest};
use crate::error::ApiError;
use crate::matching::{CriteriaRequest, LenderCriteria};
use crate::middleware::ValidatedJson;
use crate::models::MessageResponse;
use crate::state::AppState;

/// POST /lender/criteria - Replace the lender's matching criteria
pub async fn set_criteria(
    State(state): State<AppState>,
    LenderUser(user): LenderUser,
    ValidatedJson(req): ValidatedJson<CriteriaRequest>,
) -> Result<Json<LenderCriteria>, ApiError> {
    let criteria = state.deal_service.set_criteria(&user.actor(), req).await?;
    Ok(Json(criteria))
}

/// GET /lender/criteria - Stored criteria, or null
pub async fn get_criteria(
    State(state): State<AppState>,
    LenderUser(user): LenderUser,
) -> Result<Json<Option<LenderCriteria>>, ApiError> {
    let criteria = state.deal_service.get_criteria(&user.actor()).await?;
    Ok(Json(criteria))
}

/// GET /lender/deals - Pending deals matching the criteria
pub async fn available_deals(
    State(state): State<AppState>,
    LenderUser(user): LenderUser,
) -> Result<Json<Vec<Deal>>, ApiError> {
    let deals = state.deal_service.available_deals(&user.actor()).await?;
    Ok(Json(deals))
}

/// POST /lender/interest - Express interest in a deal
pub async fn express_interest(
    State(state): State<AppState>,
    LenderUser(user): LenderUser,
    ValidatedJson(req): ValidatedJson<ExpressInterestRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .deal_service
        .express_interest(&user.actor(), req)
        .await?;

    Ok(Json(MessageResponse::new("Interest expressed successfully")))
}
