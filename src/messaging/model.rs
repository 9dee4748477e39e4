//! Message models

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::models::UserRole;

/// A message in a deal conversation
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Message {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender_role: UserRole,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Request DTO for sending a message
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 5000, message = "message must be 1-5000 characters"))]
    pub message: String,
}
