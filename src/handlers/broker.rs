//! Broker HTTP handlers

use axum::{extract::State, Json};

use super::BrokerUser;
use crate::deal::{CreateDealRequest, Deal};
use crate::error::ApiError;
use crate::middleware::ValidatedJson;
use crate::state::AppState;

/// POST /broker/deals - Create a pending deal
pub async fn create_deal(
    State(state): State<AppState>,
    BrokerUser(user): BrokerUser,
    ValidatedJson(req): ValidatedJson<CreateDealRequest>,
) -> Result<Json<Deal>, ApiError> {
    let deal = state.deal_service.create_deal(&user.actor(), req).await?;
    Ok(Json(deal))
}

/// GET /broker/deals - The caller's own deals
pub async fn list_deals(
    State(state): State<AppState>,
    BrokerUser(user): BrokerUser,
) -> Result<Json<Vec<Deal>>, ApiError> {
    let deals = state.deal_service.list_broker_deals(&user.actor()).await?;
    Ok(Json(deals))
}
