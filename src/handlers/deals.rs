//! Deal-scoped HTTP handlers
//!
//! Every route here names a deal in its path. Services load the deal and run
//! the access guard; handlers only translate HTTP.

use axum::{extract::State, Json};

use super::AuthenticatedUser;
use crate::deal::{LenderInterest, SelectLenderRequest};
use crate::error::ApiError;
use crate::messaging::{Message, SendMessageRequest};
use crate::middleware::{DealId, ValidatedJson};
use crate::models::MessageResponse;
use crate::state::AppState;
use crate::vault::{DocumentMetadata, UploadDocumentRequest, UploadDocumentResponse};

/// GET /deals/:id/interests - Interests recorded on the deal (owner only)
pub async fn list_interests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    DealId(deal_id): DealId,
) -> Result<Json<Vec<LenderInterest>>, ApiError> {
    let interests = state
        .deal_service
        .list_interests(&user.actor(), deal_id)
        .await?;
    Ok(Json(interests))
}

/// POST /deals/:id/select-lender - Choose a lender and start the deal
pub async fn select_lender(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    DealId(deal_id): DealId,
    ValidatedJson(req): ValidatedJson<SelectLenderRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .deal_service
        .select_lender(&user.actor(), deal_id, req.lender_id)
        .await?;

    Ok(Json(MessageResponse::new("Lender selected successfully")))
}

/// POST /deals/:id/complete - Mark the deal completed
pub async fn complete_deal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    DealId(deal_id): DealId,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .deal_service
        .complete_deal(&user.actor(), deal_id)
        .await?;

    Ok(Json(MessageResponse::new("Deal completed successfully")))
}

/// POST /deals/:id/messages
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    DealId(deal_id): DealId,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let message = state
        .message_log
        .append(&user.actor(), deal_id, req.message)
        .await?;
    Ok(Json(message))
}

/// GET /deals/:id/messages - Oldest first
pub async fn list_messages(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    DealId(deal_id): DealId,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state.message_log.list(&user.actor(), deal_id).await?;
    Ok(Json(messages))
}

/// POST /deals/:id/documents
pub async fn upload_document(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    DealId(deal_id): DealId,
    ValidatedJson(req): ValidatedJson<UploadDocumentRequest>,
) -> Result<Json<UploadDocumentResponse>, ApiError> {
    let document_id = state
        .document_vault
        .upload(&user.actor(), deal_id, req)
        .await?;

    Ok(Json(UploadDocumentResponse {
        message: "Document uploaded successfully".to_string(),
        document_id,
    }))
}

/// GET /deals/:id/documents - Metadata only
pub async fn list_documents(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    DealId(deal_id): DealId,
) -> Result<Json<Vec<DocumentMetadata>>, ApiError> {
    let documents = state.document_vault.list(&user.actor(), deal_id).await?;
    Ok(Json(documents))
}
